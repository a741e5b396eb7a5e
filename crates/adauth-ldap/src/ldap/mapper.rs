//! Directory entries to user and group records

use adauth_core::{AttributeNames, Group, User};

use super::types::DirectoryEntry;

/// Projects entries onto records through the configured attribute names.
/// Missing attributes map to empty strings.
#[derive(Debug, Clone)]
pub struct ResultMapper {
    attributes: AttributeNames,
}

impl ResultMapper {
    pub fn new(attributes: AttributeNames) -> Self {
        Self { attributes }
    }

    /// Map a user entry. `groups` is left empty.
    pub fn to_user(&self, entry: &DirectoryEntry) -> User {
        let attrs = &self.attributes;

        User {
            login: attr(entry, &attrs.unique_name),
            name: attr(entry, &attrs.display_name),
            distinguished_name: entry
                .first(&attrs.distinguished_name)
                .unwrap_or(&entry.dn)
                .to_string(),
            mail: attr(entry, &attrs.mail),
            telephone_number: attr(entry, &attrs.telephone_number),
            company: attr(entry, &attrs.company),
            groups: Vec::new(),
        }
    }

    pub fn to_group(&self, entry: &DirectoryEntry) -> Group {
        Group {
            code: attr(entry, &self.attributes.unique_name),
            name: attr(entry, &self.attributes.display_name),
        }
    }
}

fn attr(entry: &DirectoryEntry, name: &str) -> String {
    entry.first(name).unwrap_or_default().to_string()
}
