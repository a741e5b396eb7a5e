//! Directory configuration
//!
//! Example config:
//! ```toml
//! host = "dc01.corp.example.com"
//! port = 389
//! domain = "corp.example.com"
//! bind_user = "CORP\\svc-directory"
//! bind_password = "secret"
//! base_path = "DC=corp,DC=example,DC=com"
//!
//! [object_classes]
//! user = "user"
//! group = "group"
//!
//! [attributes]
//! unique_name = "sAMAccountName"
//! display_name = "displayName"
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::{Error, Result, DEFAULT_LDAP_PORT};

/// Directory server settings, read-only for the lifetime of a request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DirectoryConfig {
    /// Directory host name or address
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// DNS domain used to qualify bare logins when binding as a user
    #[serde(default)]
    pub domain: String,

    /// Service account used for searches
    #[serde(default)]
    pub bind_user: String,

    #[serde(default)]
    pub bind_password: String,

    /// Search base for all lookups
    /// Example: "DC=corp,DC=example,DC=com"
    #[serde(default)]
    pub base_path: String,

    /// Connect with ldaps://
    #[serde(default)]
    pub use_tls: bool,

    /// Upgrade a plain connection with STARTTLS
    #[serde(default)]
    pub start_tls: bool,

    /// Connect and per-operation timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default)]
    pub object_classes: ObjectClasses,

    #[serde(default)]
    pub attributes: AttributeNames,
}

fn default_port() -> u16 {
    DEFAULT_LDAP_PORT
}

fn default_timeout() -> u64 {
    10
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_port(),
            domain: String::new(),
            bind_user: String::new(),
            bind_password: String::new(),
            base_path: String::new(),
            use_tls: false,
            start_tls: false,
            timeout_seconds: default_timeout(),
            object_classes: ObjectClasses::default(),
            attributes: AttributeNames::default(),
        }
    }
}

/// Object classes used to tell users and groups apart
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ObjectClasses {
    #[serde(default = "default_user_class")]
    pub user: String,

    #[serde(default = "default_group_class")]
    pub group: String,
}

fn default_user_class() -> String {
    "user".to_string()
}

fn default_group_class() -> String {
    "group".to_string()
}

impl Default for ObjectClasses {
    fn default() -> Self {
        Self {
            user: default_user_class(),
            group: default_group_class(),
        }
    }
}

/// Attribute names read from directory entries
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AttributeNames {
    /// Login attribute, also the group code
    #[serde(default = "default_unique_name_attr")]
    pub unique_name: String,

    /// Display name attribute, also the group name
    #[serde(default = "default_display_name_attr")]
    pub display_name: String,

    /// Group membership attribute
    #[serde(default = "default_group_member_attr")]
    pub group_member: String,

    #[serde(default = "default_distinguished_name_attr")]
    pub distinguished_name: String,

    #[serde(default = "default_mail_attr")]
    pub mail: String,

    #[serde(default = "default_telephone_number_attr")]
    pub telephone_number: String,

    #[serde(default = "default_company_attr")]
    pub company: String,
}

fn default_unique_name_attr() -> String {
    "sAMAccountName".to_string()
}

fn default_display_name_attr() -> String {
    "displayName".to_string()
}

fn default_group_member_attr() -> String {
    "member".to_string()
}

fn default_distinguished_name_attr() -> String {
    "distinguishedName".to_string()
}

fn default_mail_attr() -> String {
    "mail".to_string()
}

fn default_telephone_number_attr() -> String {
    "telephoneNumber".to_string()
}

fn default_company_attr() -> String {
    "company".to_string()
}

impl Default for AttributeNames {
    fn default() -> Self {
        Self {
            unique_name: default_unique_name_attr(),
            display_name: default_display_name_attr(),
            group_member: default_group_member_attr(),
            distinguished_name: default_distinguished_name_attr(),
            mail: default_mail_attr(),
            telephone_number: default_telephone_number_attr(),
            company: default_company_attr(),
        }
    }
}

impl DirectoryConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| Error::Configuration(format!("Failed to parse config: {}", e)))
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("ADAUTH_HOST") {
            config.host = host;
        }
        if let Ok(port) = std::env::var("ADAUTH_PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }
        if let Ok(domain) = std::env::var("ADAUTH_DOMAIN") {
            config.domain = domain;
        }
        if let Ok(user) = std::env::var("ADAUTH_BIND_USER") {
            config.bind_user = user;
        }
        if let Ok(password) = std::env::var("ADAUTH_BIND_PASSWORD") {
            config.bind_password = password;
        }
        if let Ok(path) = std::env::var("ADAUTH_BASE_PATH") {
            config.base_path = path;
        }
        if std::env::var("ADAUTH_USE_TLS").map(|v| v == "true").unwrap_or(false) {
            config.use_tls = true;
        }
        if std::env::var("ADAUTH_START_TLS").map(|v| v == "true").unwrap_or(false) {
            config.start_tls = true;
        }
        if let Ok(timeout) = std::env::var("ADAUTH_TIMEOUT_SECONDS") {
            if let Ok(t) = timeout.parse() {
                config.timeout_seconds = t;
            }
        }

        config
    }

    /// Replace the configured host
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Fail unless a host is configured. Runs before any directory operation.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(Error::Configuration("LDAP host not configured".to_string()));
        }
        Ok(())
    }

    /// Fail unless the service account used for searches is configured
    pub fn validate_bind_credentials(&self) -> Result<()> {
        if self.bind_user.trim().is_empty() {
            return Err(Error::Configuration("LDAP bind user not configured".to_string()));
        }
        if self.bind_password.is_empty() {
            return Err(Error::Configuration(
                "LDAP bind password not configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Server URL in the form ldap3 connects to
    pub fn server_url(&self) -> String {
        let scheme = if self.use_tls { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
