//! Error types for adauth

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration value is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required caller argument is blank. Holds the argument name.
    #[error("Invalid argument: {0} must not be blank")]
    InvalidArgument(String),

    /// The directory could not be reached
    #[error("Directory unreachable: {0}")]
    Connection(String),

    /// The directory rejected the bind
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// A lookup matched no entry
    #[error(
        "No entry with {attribute}={login} of class '{object_class}' under '{search_path}'"
    )]
    NotFound {
        login: String,
        search_path: String,
        object_class: String,
        attribute: String,
    },

    /// Unclassified failure while searching
    #[error("Search failed: {0}")]
    Search(String),

    /// Reading a configuration file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Configuration(_) => "ConfigurationError",
            Error::InvalidArgument(_) => "InvalidArgument",
            Error::Connection(_) => "DirectoryUnreachable",
            Error::Authentication(_) => "InvalidCredentials",
            Error::NotFound { .. } => "NotFound",
            Error::Search(_) => "SearchError",
            Error::Io(_) => "IoError",
        }
    }
}
