//! Active Directory authentication and lookups for adauth

pub mod ldap;

pub use ldap::{AdAuthenticator, DirectoryConnector, LdapConnector, SearchFilter};
