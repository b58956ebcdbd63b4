// src/services/search.rs

//! Paginated search traversal.
//!
//! Walks the search endpoint page by page until the target stub count is
//! reached or the platform runs out of results, pacing every request.

use std::time::Duration;

use crate::error::AppError;
use crate::models::{ItemStub, SearchQuery};
use crate::pipeline::CancelToken;
use crate::services::api::NoteApi;

/// Result of the search stage.
#[derive(Debug, Default)]
pub struct SearchOutcome {
    /// Note stubs, in retrieval order, truncated to the target count
    pub stubs: Vec<ItemStub>,

    /// Number of page requests issued
    pub pages_fetched: usize,

    /// Failure that ended the traversal early, if any (partial stubs are
    /// still returned)
    pub failure: Option<AppError>,
}

/// Service walking the paginated search endpoint.
pub struct NoteSearcher<'a> {
    api: &'a dyn NoteApi,
    page_delay: Duration,
}

impl<'a> NoteSearcher<'a> {
    pub fn new(api: &'a dyn NoteApi, page_delay: Duration) -> Self {
        Self { api, page_delay }
    }

    /// Collect note stubs for a query.
    ///
    /// Stops on: a failed page fetch (partial stubs kept), the target count
    /// reached, `has_more == false`, or an empty page.
    pub async fn collect(&self, query: &SearchQuery, cancel: &CancelToken) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut page: u32 = 1;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            let result = self.api.search_page(query, page).await;
            outcome.pages_fetched += 1;

            // Pace every page request, the final one included.
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }

            let fetched = match result {
                Ok(fetched) => fetched,
                Err(e) => {
                    log::warn!("search page {page} failed: {e}");
                    outcome.failure = Some(e);
                    break;
                }
            };

            let raw_count = fetched.stubs.len();
            let mut stubs = fetched.stubs;
            // Ads and inline query suggestions never count toward the target.
            stubs.retain(ItemStub::is_note);
            outcome.stubs.extend(stubs);

            if outcome.stubs.len() >= query.target_count {
                outcome.stubs.truncate(query.target_count);
                break;
            }
            if !fetched.has_more {
                break;
            }
            if raw_count == 0 {
                // A malformed envelope claiming has_more with no items would
                // otherwise loop forever.
                log::warn!("search page {page} returned no items, stopping");
                break;
            }

            page += 1;
        }

        outcome
    }
}
