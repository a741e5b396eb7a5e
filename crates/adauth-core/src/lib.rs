//! adauth core library
//!
//! Directory configuration, error taxonomy and the user/group records
//! shared by the directory client and the command-line exerciser.

pub mod config;
pub mod error;
pub mod login;
pub mod types;

pub use config::{AttributeNames, DirectoryConfig, ObjectClasses};
pub use error::{Error, Result};
pub use types::{Group, User};

/// adauth version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default LDAP port
pub const DEFAULT_LDAP_PORT: u16 = 389;

/// Default page size for paginated user searches
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Window requested per round when enumerating a whole result set
pub const DEFAULT_ENUMERATION_WINDOW: usize = 1000;
