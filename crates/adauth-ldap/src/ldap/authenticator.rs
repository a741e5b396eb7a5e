//! Active Directory authentication and lookups
//!
//! Each operation validates configuration and arguments before touching the
//! network, then opens one connection for its search and releases it on
//! every exit path.

use adauth_core::login::{is_domain_qualified, normalize_login};
use adauth_core::{DirectoryConfig, Error, Group, Result, User};
use ldap3::ldap_escape;
use tracing::{debug, info};

use super::connection::{release, DirectoryConnector, LdapConnector};
use super::mapper::ResultMapper;
use super::search::{self, SearchFilter};
use super::types::DirectoryEntry;

/// Directory client for authentication, user lookup and group enumeration
pub struct AdAuthenticator<C = LdapConnector> {
    config: DirectoryConfig,
    connector: C,
    mapper: ResultMapper,
}

impl AdAuthenticator<LdapConnector> {
    /// Create an authenticator talking LDAP to the configured host
    pub fn new(config: DirectoryConfig) -> Self {
        let connector = LdapConnector::new(&config);
        Self::with_connector(config, connector)
    }
}

impl<C: DirectoryConnector> AdAuthenticator<C> {
    pub fn with_connector(config: DirectoryConfig, connector: C) -> Self {
        let mapper = ResultMapper::new(config.attributes.clone());
        Self {
            config,
            connector,
            mapper,
        }
    }

    pub fn config(&self) -> &DirectoryConfig {
        &self.config
    }

    /// Verify `login`/`password` with a bind as that user, then return the
    /// user with group memberships.
    ///
    /// `login` may carry a `DOMAIN\` prefix or an `@domain` suffix; the bind
    /// uses it as given and the lookup uses the bare account name.
    pub async fn authenticate_and_return_user(&self, login: &str, password: &str) -> Result<User> {
        self.config.validate()?;
        ensure_not_blank("login", login)?;
        ensure_not_blank("password", password)?;

        let account = normalize_login(login);
        let bind_identity = self.bind_identity(login);

        info!(login = account, "Authenticating directory user");
        self.verify_credentials(&bind_identity, password).await?;

        self.user_by_login(account).await
    }

    /// Look up the user whose unique name equals `login`, with groups
    pub async fn user_by_login(&self, login: &str) -> Result<User> {
        self.config.validate()?;
        ensure_not_blank("login", login)?;

        let attrs = &self.config.attributes;
        let criteria = format!(
            "(&(objectClass={})({}={}))",
            self.config.object_classes.user,
            attrs.unique_name,
            ldap_escape(login)
        );

        let (entries, _) = self
            .run(SearchFilter::enumerate(&self.config.base_path, criteria))
            .await?;

        let entry = entries.first().ok_or_else(|| Error::NotFound {
            login: login.to_string(),
            search_path: self.config.base_path.clone(),
            object_class: self.config.object_classes.user.clone(),
            attribute: attrs.unique_name.clone(),
        })?;

        let mut user = self.mapper.to_user(entry);
        user.groups = self.groups(Some(&user.distinguished_name)).await?;

        Ok(user)
    }

    /// All groups, or only those listing `member_dn` as a member
    pub async fn groups(&self, member_dn: Option<&str>) -> Result<Vec<Group>> {
        self.config.validate()?;

        let mut criteria = format!("(objectClass={})", self.config.object_classes.group);
        if let Some(dn) = member_dn.filter(|dn| !dn.trim().is_empty()) {
            criteria = format!(
                "(&{}({}={}))",
                criteria,
                self.config.attributes.group_member,
                ldap_escape(dn)
            );
        }

        let (entries, _) = self
            .run(SearchFilter::enumerate(&self.config.base_path, criteria))
            .await?;

        debug!("Found {} groups", entries.len());
        Ok(entries.iter().map(|e| self.mapper.to_group(e)).collect())
    }

    /// Every user entry, without groups
    pub async fn all_users(&self) -> Result<Vec<User>> {
        self.config.validate()?;

        let criteria = format!("(objectClass={})", self.config.object_classes.user);
        let (entries, _) = self
            .run(SearchFilter::enumerate(&self.config.base_path, criteria))
            .await?;

        Ok(self.users(&entries))
    }

    /// One page of users whose unique name contains `text`, and the total
    /// number of matches
    pub async fn users_by_filter(
        &self,
        text: &str,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<User>, usize)> {
        let attribute = self.config.attributes.unique_name.clone();
        self.users_page(&attribute, text, page, page_size, None).await
    }

    /// One page of users whose display name contains `text`, ordered by
    /// display name, and the total number of matches
    pub async fn users_by_name_filter(
        &self,
        text: &str,
        page: usize,
        page_size: usize,
    ) -> Result<(Vec<User>, usize)> {
        let attribute = self.config.attributes.display_name.clone();
        self.users_page(&attribute, text, page, page_size, Some(&attribute))
            .await
    }

    async fn users_page(
        &self,
        attribute: &str,
        text: &str,
        page: usize,
        page_size: usize,
        order_by: Option<&str>,
    ) -> Result<(Vec<User>, usize)> {
        self.config.validate()?;

        let criteria = format!(
            "(&(objectClass={})({}={}))",
            self.config.object_classes.user,
            attribute,
            substring(text)
        );

        let mut filter = SearchFilter::page(&self.config.base_path, criteria, page, page_size);
        if let Some(order_by) = order_by {
            filter = filter.ordered_by(order_by);
        }

        let (entries, total) = self.run(filter).await?;
        Ok((self.users(&entries), total))
    }

    /// Bind as the user and drop the connection straight away
    async fn verify_credentials(&self, bind_identity: &str, password: &str) -> Result<()> {
        let session = self.connector.connect(bind_identity, password).await?;
        release(session).await;
        debug!("Credentials accepted for {}", bind_identity);
        Ok(())
    }

    /// Run one search on a fresh service-account connection. Returns the
    /// entries and the total number of matches.
    async fn run(&self, mut filter: SearchFilter) -> Result<(Vec<DirectoryEntry>, usize)> {
        self.config.validate_bind_credentials()?;

        let mut session = self
            .connector
            .connect(&self.config.bind_user, &self.config.bind_password)
            .await?;

        let outcome = search::search(
            &mut filter,
            &self.config.attributes.unique_name,
            session.as_mut(),
        )
        .await;
        release(session).await;

        let entries = outcome?;
        Ok((entries, filter.total()))
    }

    fn users(&self, entries: &[DirectoryEntry]) -> Vec<User> {
        entries.iter().map(|e| self.mapper.to_user(e)).collect()
    }

    /// Qualify a bare login with the configured domain for the bind
    fn bind_identity(&self, login: &str) -> String {
        if is_domain_qualified(login) || self.config.domain.trim().is_empty() {
            login.to_string()
        } else {
            format!("{}@{}", login, self.config.domain.trim())
        }
    }
}

fn ensure_not_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidArgument(field.to_string()));
    }
    Ok(())
}

/// Substring assertion value; an empty `text` matches every value
fn substring(text: &str) -> String {
    if text.is_empty() {
        "*".to_string()
    } else {
        format!("*{}*", ldap_escape(text))
    }
}
