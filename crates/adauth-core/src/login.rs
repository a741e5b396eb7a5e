//! Login normalization

/// Strip a `DOMAIN\` prefix or an `@domain` suffix from a login.
///
/// Only one form is stripped. The backslash form is checked first, so
/// `CORP\alice@corp.example.com` becomes `alice@corp.example.com`.
pub fn normalize_login(login: &str) -> &str {
    if let Some((_, account)) = login.split_once('\\') {
        return account;
    }
    if let Some((account, _)) = login.split_once('@') {
        return account;
    }
    login
}

/// Whether the login already names its domain in either form
pub fn is_domain_qualified(login: &str) -> bool {
    login.contains('\\') || login.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_login() {
        assert_eq!(normalize_login("DOMAIN\\alice"), "alice");
        assert_eq!(normalize_login("alice@example.com"), "alice");
        assert_eq!(normalize_login("alice"), "alice");
    }

    #[test]
    fn test_backslash_form_wins() {
        assert_eq!(normalize_login("CORP\\alice@example.com"), "alice@example.com");
    }

    #[test]
    fn test_domain_qualified() {
        assert!(is_domain_qualified("CORP\\alice"));
        assert!(is_domain_qualified("alice@corp"));
        assert!(!is_domain_qualified("alice"));
    }
}
