//! Active Directory access over LDAP
//!
//! Provides:
//! - Credential verification by simple bind
//! - User and group lookup
//! - Paginated user search with server-side sort and virtual list view

mod authenticator;
mod connection;
mod controls;
mod mapper;
mod search;
mod types;

#[cfg(test)]
mod fake;

pub use authenticator::AdAuthenticator;
pub use connection::{release, DirectoryConnector, DirectorySession, LdapConnector, ResultStream};
pub use controls::{SortControl, VirtualListView, VirtualListViewResponse};
pub use mapper::ResultMapper;
pub use search::{search, SearchFilter};
pub use types::*;
