//! In-memory directory used by the unit tests

use std::collections::VecDeque;
use std::sync::Arc;

use adauth_core::{Error, Result};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::connection::{DirectoryConnector, DirectorySession, ResultStream};
use super::controls::VirtualListViewResponse;
use super::types::{DirectoryEntry, RoundControls, SearchRequest, StreamItem};

pub const SERVICE_USER: &str = "CORP\\svc-directory";
pub const SERVICE_PASSWORD: &str = "service-secret";

/// Answers each search with the entries of the first rule whose key occurs
/// in the filter, windowed by the request's VLV control.
#[derive(Clone)]
pub struct FakeDirectory {
    state: Arc<Mutex<FakeState>>,
}

struct FakeState {
    rules: Vec<(String, Vec<DirectoryEntry>)>,
    credentials: Vec<(String, String)>,
    vlv: bool,
    referral_after: Option<usize>,
    failure_after: Option<usize>,
    unreachable: bool,
    connections: Vec<String>,
    requests: Vec<SearchRequest>,
    unbinds: usize,
}

impl FakeDirectory {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                rules: Vec::new(),
                credentials: vec![(SERVICE_USER.to_string(), SERVICE_PASSWORD.to_string())],
                vlv: true,
                referral_after: None,
                failure_after: None,
                unreachable: false,
                connections: Vec::new(),
                requests: Vec::new(),
                unbinds: 0,
            })),
        }
    }

    pub fn rule(self, filter_contains: &str, entries: Vec<DirectoryEntry>) -> Self {
        self.state
            .lock()
            .rules
            .push((filter_contains.to_string(), entries));
        self
    }

    pub fn accept(self, user: &str, password: &str) -> Self {
        self.state
            .lock()
            .credentials
            .push((user.to_string(), password.to_string()));
        self
    }

    /// Ignore VLV requests and return no response controls
    pub fn without_vlv(self) -> Self {
        self.state.lock().vlv = false;
        self
    }

    /// Emit a referral after `n` entries of every round
    pub fn referral_after(self, n: usize) -> Self {
        self.state.lock().referral_after = Some(n);
        self
    }

    /// Fail the stream after `n` entries of every round
    pub fn failure_after(self, n: usize) -> Self {
        self.state.lock().failure_after = Some(n);
        self
    }

    pub fn unreachable(self) -> Self {
        self.state.lock().unreachable = true;
        self
    }

    pub fn session(&self) -> Box<dyn DirectorySession> {
        Box::new(FakeSession {
            state: self.state.clone(),
        })
    }

    /// Bind identities of every connection attempt
    pub fn connections(&self) -> Vec<String> {
        self.state.lock().connections.clone()
    }

    pub fn requests(&self) -> Vec<SearchRequest> {
        self.state.lock().requests.clone()
    }

    pub fn unbinds(&self) -> usize {
        self.state.lock().unbinds
    }
}

impl Default for FakeDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryConnector for FakeDirectory {
    async fn connect(
        &self,
        bind_user: &str,
        bind_password: &str,
    ) -> Result<Box<dyn DirectorySession>> {
        let mut state = self.state.lock();
        state.connections.push(bind_user.to_string());

        if state.unreachable {
            return Err(Error::Connection("connection refused".to_string()));
        }

        let accepted = state
            .credentials
            .iter()
            .any(|(user, password)| user == bind_user && password == bind_password);
        if !accepted {
            return Err(Error::Authentication(format!(
                "Invalid credentials for {}",
                bind_user
            )));
        }

        drop(state);
        Ok(self.session())
    }
}

struct FakeSession {
    state: Arc<Mutex<FakeState>>,
}

#[async_trait]
impl DirectorySession for FakeSession {
    async fn search(&mut self, request: SearchRequest) -> Result<Box<dyn ResultStream>> {
        let mut state = self.state.lock();
        state.requests.push(request.clone());

        let matching = state
            .rules
            .iter()
            .find(|(key, _)| request.filter.contains(key.as_str()))
            .map(|(_, entries)| entries.clone())
            .unwrap_or_default();

        let (window, controls) = if state.vlv {
            let start = request.vlv.offset.saturating_sub(1).min(matching.len());
            let end = (start + request.vlv.after_count + 1).min(matching.len());
            let response = VirtualListViewResponse {
                content_count: matching.len(),
                result: 0,
            };
            (matching[start..end].to_vec(), RoundControls::with_vlv(response))
        } else {
            (matching, RoundControls::none())
        };

        let mut items = VecDeque::new();
        for (i, entry) in window.into_iter().enumerate() {
            if state.referral_after == Some(i) {
                items.push_back(Ok(StreamItem::Referral(vec![
                    "ldap://DomainDnsZones.corp.example.com/DC=DomainDnsZones".to_string(),
                ])));
            }
            if state.failure_after == Some(i) {
                items.push_back(Err(Error::Search("connection reset".to_string())));
            }
            items.push_back(Ok(StreamItem::Entry(entry)));
        }

        Ok(Box::new(FakeStream { items, controls }))
    }

    async fn unbind(&mut self) -> Result<()> {
        self.state.lock().unbinds += 1;
        Ok(())
    }
}

struct FakeStream {
    items: VecDeque<Result<StreamItem>>,
    controls: RoundControls,
}

#[async_trait]
impl ResultStream for FakeStream {
    async fn next(&mut self) -> Result<Option<StreamItem>> {
        self.items.pop_front().transpose()
    }

    async fn finish(&mut self) -> RoundControls {
        self.items.clear();
        self.controls
    }
}

/// `n` user entries sorted by login
pub fn users(n: usize) -> Vec<DirectoryEntry> {
    (0..n)
        .map(|i| {
            let login = format!("user{:03}", i);
            DirectoryEntry::new(format!("CN={},OU=Staff,DC=corp,DC=example,DC=com", login))
                .with_attr("sAMAccountName", login.clone())
                .with_attr("displayName", format!("User {:03}", i))
        })
        .collect()
}
