//! Bound directory connections
//!
//! Every operation opens its own connection, binds, runs one logical search
//! or bind check, and unbinds before returning. The traits here are the seam
//! between the search engine and ldap3, so the engine can run against any
//! directory session.

use std::time::Duration;

use adauth_core::{DirectoryConfig, Error, Result};
use async_trait::async_trait;
use ldap3::{parse_refs, Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchEntry, SearchStream};
use tracing::{debug, warn};

use super::controls::{VirtualListViewResponse, VLV_RESPONSE_OID};
use super::types::{RoundControls, SearchRequest, StreamItem};

/// LDAP result code for a rejected simple bind
const INVALID_CREDENTIALS: u32 = 49;

/// Opens bound sessions against a directory
#[async_trait]
pub trait DirectoryConnector: Send + Sync {
    /// Connect and simple-bind as `bind_user`.
    ///
    /// Fails with [`Error::Connection`] when the server cannot be reached and
    /// with [`Error::Authentication`] when the bind is rejected. A connection
    /// that fails to bind is closed before the error is returned.
    async fn connect(
        &self,
        bind_user: &str,
        bind_password: &str,
    ) -> Result<Box<dyn DirectorySession>>;
}

/// A connection that is open and bound
#[async_trait]
pub trait DirectorySession: Send {
    /// Start one subtree search round, requesting all user attributes
    async fn search(&mut self, request: SearchRequest) -> Result<Box<dyn ResultStream>>;

    async fn unbind(&mut self) -> Result<()>;
}

/// Results of one search round, read item by item
#[async_trait]
pub trait ResultStream: Send {
    async fn next(&mut self) -> Result<Option<StreamItem>>;

    /// Consume the rest of the round and return its response controls
    async fn finish(&mut self) -> RoundControls;
}

/// Unbind a session, logging instead of failing
pub async fn release(mut session: Box<dyn DirectorySession>) {
    if let Err(e) = session.unbind().await {
        warn!("Failed to unbind LDAP session: {}", e);
    }
}

// ============================================================================
// ldap3 implementation
// ============================================================================

/// Connector speaking LDAPv3 through ldap3
#[derive(Debug, Clone)]
pub struct LdapConnector {
    server_url: String,
    start_tls: bool,
    timeout: Duration,
}

impl LdapConnector {
    pub fn new(config: &DirectoryConfig) -> Self {
        Self {
            server_url: config.server_url(),
            start_tls: config.start_tls,
            timeout: config.timeout(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    async fn create_connection(&self) -> Result<(LdapConnAsync, Ldap)> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.timeout)
            .set_starttls(self.start_tls);

        debug!("Connecting to LDAP server: {}", self.server_url);

        LdapConnAsync::with_settings(settings, &self.server_url)
            .await
            .map_err(|e| {
                Error::Connection(format!(
                    "Failed to connect to LDAP server {}: {}",
                    self.server_url, e
                ))
            })
    }
}

#[async_trait]
impl DirectoryConnector for LdapConnector {
    async fn connect(
        &self,
        bind_user: &str,
        bind_password: &str,
    ) -> Result<Box<dyn DirectorySession>> {
        // An empty password turns a simple bind into an unauthenticated one,
        // which most servers accept.
        if bind_password.is_empty() {
            return Err(Error::Authentication(format!(
                "Empty password for {}",
                bind_user
            )));
        }

        let (conn, mut ldap) = self.create_connection().await?;
        ldap3::drive!(conn);

        debug!("Binding as {}", bind_user);

        let result = match ldap
            .with_timeout(self.timeout)
            .simple_bind(bind_user, bind_password)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                let _ = ldap.unbind().await;
                return Err(Error::Connection(format!("Bind request failed: {}", e)));
            }
        };

        if result.rc != 0 {
            let _ = ldap.unbind().await;
            return Err(bind_rejected(bind_user, result.rc, &result.text));
        }

        Ok(Box::new(LdapSession {
            ldap,
            timeout: self.timeout,
        }))
    }
}

fn bind_rejected(bind_user: &str, rc: u32, text: &str) -> Error {
    if rc == INVALID_CREDENTIALS {
        Error::Authentication(format!("Invalid credentials for {}", bind_user))
    } else {
        Error::Authentication(format!(
            "Bind as {} rejected with code {}: {}",
            bind_user, rc, text
        ))
    }
}

struct LdapSession {
    ldap: Ldap,
    timeout: Duration,
}

#[async_trait]
impl DirectorySession for LdapSession {
    async fn search(&mut self, request: SearchRequest) -> Result<Box<dyn ResultStream>> {
        let controls = vec![request.sort.to_raw()?, request.vlv.to_raw()?];

        let stream = self
            .ldap
            .with_controls(controls)
            .with_timeout(self.timeout)
            .streaming_search(
                &request.base,
                Scope::Subtree,
                &request.filter,
                Vec::<String>::new(),
            )
            .await
            .map_err(|e| Error::Search(format!("Search under '{}' failed: {}", request.base, e)))?;

        Ok(Box::new(LdapResultStream { stream }))
    }

    async fn unbind(&mut self) -> Result<()> {
        self.ldap
            .unbind()
            .await
            .map_err(|e| Error::Connection(format!("Unbind failed: {}", e)))
    }
}

struct LdapResultStream {
    stream: SearchStream<'static, String, Vec<String>>,
}

#[async_trait]
impl ResultStream for LdapResultStream {
    async fn next(&mut self) -> Result<Option<StreamItem>> {
        loop {
            let entry = match self
                .stream
                .next()
                .await
                .map_err(|e| Error::Search(format!("Failed to read search result: {}", e)))?
            {
                Some(entry) => entry,
                None => return Ok(None),
            };

            if entry.is_intermediate() {
                continue;
            }
            if entry.is_ref() {
                return Ok(Some(StreamItem::Referral(parse_refs(entry.0))));
            }
            return Ok(Some(StreamItem::Entry(SearchEntry::construct(entry).into())));
        }
    }

    async fn finish(&mut self) -> RoundControls {
        // The response controls travel with the final result message, so
        // anything the caller left unread is skipped first.
        while let Ok(Some(_)) = self.stream.next().await {}

        let result = self.stream.finish().await;
        if result.rc != 0 {
            warn!(
                rc = result.rc,
                text = %result.text,
                "Search round ended with a non-zero result code"
            );
        }

        let vlv = result
            .ctrls
            .iter()
            .find(|ctrl| ctrl.1.ctype == VLV_RESPONSE_OID)
            .and_then(|ctrl| ctrl.1.val.as_deref())
            .and_then(VirtualListViewResponse::parse);

        if let Some(response) = vlv {
            if response.result != 0 {
                debug!(result = response.result, "Server reported a VLV error");
            }
        }

        RoundControls {
            returned: !result.ctrls.is_empty(),
            vlv,
        }
    }
}
