//! CLI command implementations

pub mod auth;
pub mod groups;
pub mod search;
pub mod user;
pub mod users;

use adauth_ldap::AdAuthenticator;

use crate::OutputFormat;

/// Context passed to all commands
pub struct CommandContext {
    pub authenticator: AdAuthenticator,
    pub output_format: OutputFormat,
}

impl CommandContext {
    /// Check if output should be JSON
    pub fn is_json(&self) -> bool {
        matches!(self.output_format, OutputFormat::Json)
    }
}
