//! User record

use serde::{Deserialize, Serialize};

use super::Group;

/// Directory user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub login: String,
    pub name: String,
    pub distinguished_name: String,
    pub mail: String,
    pub telephone_number: String,
    pub company: String,

    /// Group memberships. Only filled by single-user lookups.
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl User {
    /// Whether the user belongs to the group with the given code
    pub fn is_member_of(&self, code: &str) -> bool {
        self.groups.iter().any(|g| g.code.eq_ignore_ascii_case(code))
    }
}
