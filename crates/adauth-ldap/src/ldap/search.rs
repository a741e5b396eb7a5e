//! Paginated search over server-side sort and virtual list view
//!
//! A search runs in rounds on one bound session. Each round asks for a VLV
//! window after the entries fetched so far and reads the server's content
//! count back from the response controls. The loop ends once everything the
//! server reported has been fetched, after one round for single-page
//! requests, or when the server answers without controls (no VLV support).

use adauth_core::{Result, DEFAULT_ENUMERATION_WINDOW};
use tracing::{debug, warn};

use super::connection::{DirectorySession, ResultStream};
use super::controls::build_controls;
use super::types::{DirectoryEntry, RoundControls, SearchRequest, StreamItem};

/// Pagination state of one search call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    pub search_path: String,
    /// LDAP filter string
    pub search_criteria: String,
    /// Sort attribute, the caller's default when unset
    pub order_by: Option<String>,
    pub total_per_page: usize,
    /// 1-based page number
    pub current_page: usize,
    /// Stop after one round even if more entries match
    pub single_page: bool,
    /// Ask for the total with a one-entry query before the first page
    pub count_first: bool,
    /// Entries before the next window: the pages skipped plus entries fetched
    pub total_results: usize,
    /// Server-reported number of matching entries, `None` until known
    pub content_count: Option<usize>,
}

impl SearchFilter {
    /// Fetch every matching entry, one window at a time
    pub fn enumerate(search_path: impl Into<String>, search_criteria: impl Into<String>) -> Self {
        Self {
            search_path: search_path.into(),
            search_criteria: search_criteria.into(),
            order_by: None,
            total_per_page: DEFAULT_ENUMERATION_WINDOW,
            current_page: 1,
            single_page: false,
            count_first: false,
            total_results: 0,
            content_count: None,
        }
    }

    /// Fetch one page and the total number of matching entries.
    /// `page` and `per_page` are clamped to at least 1.
    pub fn page(
        search_path: impl Into<String>,
        search_criteria: impl Into<String>,
        page: usize,
        per_page: usize,
    ) -> Self {
        let page = page.max(1);
        let per_page = per_page.max(1);

        Self {
            search_path: search_path.into(),
            search_criteria: search_criteria.into(),
            order_by: None,
            total_per_page: per_page,
            current_page: page,
            single_page: true,
            count_first: true,
            total_results: (page - 1) * per_page,
            content_count: None,
        }
    }

    pub fn ordered_by(mut self, attribute: impl Into<String>) -> Self {
        self.order_by = Some(attribute.into());
        self
    }

    /// Whether another round is needed
    pub fn wants_more(&self) -> bool {
        self.content_count
            .map_or(true, |count| self.total_results < count)
    }

    /// Number of matching entries as far as known
    pub fn total(&self) -> usize {
        self.content_count.unwrap_or(self.total_results)
    }

    fn request(&self, default_sort_attribute: &str) -> SearchRequest {
        let (sort, vlv) = build_controls(self, default_sort_attribute);
        SearchRequest {
            base: self.search_path.clone(),
            filter: self.search_criteria.clone(),
            sort,
            vlv,
        }
    }

    /// Fold one round into the pagination state. `round` is the length of
    /// `entries` before the round was drained.
    fn record_round(
        &mut self,
        controls: &RoundControls,
        entries: &mut Vec<DirectoryEntry>,
        round: usize,
    ) {
        let fetched = entries.len() - round;

        match controls.vlv {
            Some(response) => {
                self.total_results += fetched;
                self.content_count = Some(response.content_count);
            }
            // No VLV answer means the window was ignored: this round holds
            // every match, so it replaces whatever came before.
            None => {
                if controls.returned {
                    debug!("Response controls carry no VLV response");
                }
                entries.drain(..round);
                self.total_results = fetched;
                self.content_count = Some(fetched);

                if self.single_page {
                    let skipped = self.current_page.saturating_sub(1) * self.total_per_page;
                    entries.drain(..skipped.min(entries.len()));
                }
            }
        }
    }
}

/// Run `filter` to completion on `session` and return the accumulated entries.
///
/// The session stays open; releasing it is the caller's job.
pub async fn search(
    filter: &mut SearchFilter,
    default_sort_attribute: &str,
    session: &mut dyn DirectorySession,
) -> Result<Vec<DirectoryEntry>> {
    if filter.count_first {
        count_matches(filter, default_sort_attribute, session).await?;
    }

    let mut entries = Vec::new();

    while filter.wants_more() {
        let request = filter.request(default_sort_attribute);
        debug!(
            base = %request.base,
            filter = %request.filter,
            offset = request.vlv.offset,
            after = request.vlv.after_count,
            "Searching directory"
        );

        let round = entries.len();
        let mut stream = session.search(request).await?;
        let fetched = drain(stream.as_mut(), &mut entries).await;
        let controls = stream.finish().await;

        filter.record_round(&controls, &mut entries, round);

        debug!(
            fetched,
            total_results = filter.total_results,
            content_count = ?filter.content_count,
            "Search round complete"
        );

        if filter.single_page {
            break;
        }
        if fetched == 0 {
            if filter.wants_more() {
                warn!(
                    total_results = filter.total_results,
                    content_count = ?filter.content_count,
                    "Directory returned an empty window before the reported end"
                );
            }
            break;
        }
    }

    if filter.single_page {
        entries.truncate(filter.total_per_page);
    }

    Ok(entries)
}

/// Ask the server how many entries match with a one-entry window, without
/// keeping the entry.
async fn count_matches(
    filter: &mut SearchFilter,
    default_sort_attribute: &str,
    session: &mut dyn DirectorySession,
) -> Result<()> {
    let counting = SearchFilter {
        total_per_page: 1,
        total_results: 0,
        content_count: None,
        ..filter.clone()
    };

    let mut stream = session.search(counting.request(default_sort_attribute)).await?;
    let mut discarded = Vec::new();
    drain(stream.as_mut(), &mut discarded).await;
    let controls = stream.finish().await;

    if let Some(response) = controls.vlv {
        debug!(content_count = response.content_count, "Directory reported match count");
        filter.content_count = Some(response.content_count);
    }

    Ok(())
}

/// Append the round's entries to `entries` and return how many were added.
/// Referrals are skipped; a read error ends the round early.
async fn drain(stream: &mut dyn ResultStream, entries: &mut Vec<DirectoryEntry>) -> usize {
    let mut fetched = 0;

    loop {
        match stream.next().await {
            Ok(Some(StreamItem::Entry(entry))) => {
                entries.push(entry);
                fetched += 1;
            }
            Ok(Some(StreamItem::Referral(urls))) => {
                debug!(?urls, "Skipping referral in search results");
            }
            Ok(None) => break,
            Err(e) => {
                warn!("Search round stopped: {}", e);
                break;
            }
        }
    }

    fetched
}
