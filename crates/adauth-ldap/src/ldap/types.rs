//! Directory wire-level types

use std::collections::HashMap;

use ldap3::SearchEntry;

use super::controls::{SortControl, VirtualListView, VirtualListViewResponse};

// ============================================================================
// Directory Entry
// ============================================================================

/// Raw directory entry: a DN and its attribute bag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub dn: String,
    pub attrs: HashMap<String, Vec<String>>,
}

impl DirectoryEntry {
    pub fn new(dn: impl Into<String>) -> Self {
        Self {
            dn: dn.into(),
            attrs: HashMap::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.entry(name.into()).or_default().push(value.into());
        self
    }

    /// First value of an attribute. Attribute names match case-insensitively,
    /// as directory servers treat them.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values(name).and_then(|v| v.first()).map(|s| s.as_str())
    }

    pub fn values(&self, name: &str) -> Option<&[String]> {
        self.attrs
            .get(name)
            .or_else(|| {
                self.attrs
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, values)| values)
            })
            .map(|v| v.as_slice())
    }
}

impl From<SearchEntry> for DirectoryEntry {
    fn from(entry: SearchEntry) -> Self {
        Self {
            dn: entry.dn,
            attrs: entry.attrs.into_iter().collect(),
        }
    }
}

// ============================================================================
// Search Round
// ============================================================================

/// One subtree search round with its sort and VLV controls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub base: String,
    pub filter: String,
    pub sort: SortControl,
    pub vlv: VirtualListView,
}

/// Item read from a search result stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamItem {
    Entry(DirectoryEntry),
    /// Search continuation reference carrying referral URLs
    Referral(Vec<String>),
}

/// Response controls attached to the final result of a round
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundControls {
    /// Whether the server returned any response control at all
    pub returned: bool,
    pub vlv: Option<VirtualListViewResponse>,
}

impl RoundControls {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_vlv(response: VirtualListViewResponse) -> Self {
        Self {
            returned: true,
            vlv: Some(response),
        }
    }
}
