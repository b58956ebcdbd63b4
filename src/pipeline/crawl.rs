// src/pipeline/crawl.rs

//! Crawl pipeline orchestration.
//!
//! Composes search traversal, per-item detail fetch, normalization, and the
//! engagement filter into one sequential run. One request is in flight at a
//! time; the platform is rate-sensitive and sequential execution keeps
//! signing simple.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::error::AppError;
use crate::models::{CrawlerConfig, NoteRecord, SearchQuery};
use crate::pipeline::handle::{CancelToken, RunHandle};
use crate::services::{Normalizer, NoteApi, NoteSearcher};

/// Summary of one crawl run, finalized at run end.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// Note stubs returned by the search stage
    pub items_seen: usize,

    /// Stubs whose detail fetch succeeded
    pub details_fetched: usize,

    /// Records passing the engagement filter
    pub records_kept: usize,

    /// Per-item failures (detail fetch or normalization)
    pub item_errors: usize,

    /// First error encountered, if any
    pub first_error: Option<String>,

    /// Human-readable final status
    pub message: String,
}

impl RunSummary {
    fn note_error(&mut self, error: impl ToString) {
        if self.first_error.is_none() {
            self.first_error = Some(error.to_string());
        }
    }

    pub(crate) fn failed(message: String) -> Self {
        Self {
            first_error: Some(message.clone()),
            message,
            ..Self::default()
        }
    }
}

/// Records plus summary for one run.
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    /// Kept records, in retrieval order
    pub records: Vec<NoteRecord>,

    pub summary: RunSummary,
}

/// Run one crawl.
///
/// Per-item failures are counted and skipped; the run is fatal only when
/// the search stage fails outright with nothing retrieved. The outcome
/// always carries whatever records were kept plus a summary.
pub async fn run_crawl(
    api: &dyn NoteApi,
    normalizer: &Normalizer,
    query: &SearchQuery,
    pacing: &CrawlerConfig,
    cancel: &CancelToken,
) -> CrawlOutcome {
    let mut summary = RunSummary::default();
    let mut records = Vec::new();

    if let Err(e) = query.validate() {
        summary.message = format!("failed at search stage: {e}");
        summary.note_error(e);
        return CrawlOutcome { records, summary };
    }

    log::info!(
        "searching \"{}\" (target {}, sort {})",
        query.keyword,
        query.target_count,
        query.sort.as_token()
    );

    let searcher = NoteSearcher::new(api, Duration::from_millis(pacing.page_delay_ms));
    let search = searcher.collect(query, cancel).await;
    summary.items_seen = search.stubs.len();

    if let Some(failure) = search.failure {
        summary.note_error(&failure);
        if search.stubs.is_empty() {
            summary.message = format!("failed at search stage: {failure}");
            log::error!("{}", summary.message);
            return CrawlOutcome { records, summary };
        }
        log::warn!(
            "search ended early with {} stubs: {failure}",
            search.stubs.len()
        );
    }

    let stubs = search.stubs;
    let total = stubs.len();
    let detail_delay = Duration::from_millis(pacing.detail_delay_ms);
    let mut cancelled = cancel.is_cancelled();

    for (index, stub) in stubs.iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }
        if index > 0 && !detail_delay.is_zero() {
            tokio::time::sleep(detail_delay).await;
        }

        log::info!("fetching note detail {}/{}", index + 1, total);
        let raw = match api.note_detail(stub).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("detail fetch for note {} failed: {e}", stub.id);
                summary.item_errors += 1;
                summary.note_error(e);
                continue;
            }
        };
        summary.details_fetched += 1;

        let Some(record) = normalizer.normalize(&raw) else {
            let gap = AppError::normalization(format!("note {}: unusable detail payload", stub.id));
            log::warn!("{gap}, record dropped");
            summary.item_errors += 1;
            summary.note_error(gap);
            continue;
        };

        if record.passes_engagement(query.min_likes, query.min_collects) {
            records.push(record);
        }
    }

    summary.records_kept = records.len();
    summary.message = final_message(&summary, cancelled);
    log::info!("{}", summary.message);

    CrawlOutcome { records, summary }
}

/// Spawn a crawl run on the runtime and return its handle.
pub fn spawn_crawl<A>(
    api: Arc<A>,
    normalizer: Normalizer,
    query: SearchQuery,
    pacing: CrawlerConfig,
) -> RunHandle
where
    A: NoteApi + 'static,
{
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let task = tokio::spawn(async move {
        run_crawl(api.as_ref(), &normalizer, &query, &pacing, &token).await
    });
    RunHandle::new(cancel, task)
}

fn final_message(summary: &RunSummary, cancelled: bool) -> String {
    if cancelled {
        format!(
            "cancelled: kept {} of {} items",
            summary.records_kept, summary.items_seen
        )
    } else if summary.item_errors > 0 {
        format!("completed with {} skipped", summary.item_errors)
    } else {
        "completed".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::{EndpointConfig, ItemStub};
    use crate::services::SearchPage;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// One page of stubs; details scripted per note id.
    struct MockApi {
        stubs: Vec<ItemStub>,
        /// liked_count per note id, or None to fail the detail fetch
        details: Vec<(String, Option<u64>)>,
        detail_calls: AtomicUsize,
        cancel_on_first_detail: Option<CancelToken>,
        fail_search: bool,
    }

    impl MockApi {
        fn new(details: Vec<(&str, Option<u64>)>) -> Self {
            let stubs = details
                .iter()
                .map(|(id, _)| ItemStub {
                    id: id.to_string(),
                    xsec_token: "tok".to_string(),
                    model_type: "note".to_string(),
                })
                .collect();
            Self {
                stubs,
                details: details
                    .into_iter()
                    .map(|(id, likes)| (id.to_string(), likes))
                    .collect(),
                detail_calls: AtomicUsize::new(0),
                cancel_on_first_detail: None,
                fail_search: false,
            }
        }
    }

    fn detail_payload(id: &str, likes: u64) -> Value {
        json!({
            "id": id,
            "url": format!("https://www.xiaohongshu.com/explore/{id}"),
            "note_card": {
                "type": "normal",
                "title": format!("note {id}"),
                "desc": "",
                "time": 1_700_000_000_000_i64,
                "interact_info": {
                    "liked_count": likes.to_string(),
                    "collected_count": "0",
                    "comment_count": "0",
                    "share_count": "0",
                },
                "user": {"user_id": "u1", "nickname": "n", "avatar": ""},
                "image_list": [],
                "tag_list": [],
            }
        })
    }

    #[async_trait]
    impl NoteApi for MockApi {
        async fn search_page(&self, _query: &SearchQuery, _page: u32) -> Result<SearchPage> {
            if self.fail_search {
                return Err(AppError::transport("https://example/search", "HTTP status 503"));
            }
            Ok(SearchPage {
                stubs: self.stubs.clone(),
                has_more: false,
            })
        }

        async fn note_detail(&self, stub: &ItemStub) -> Result<Value> {
            self.detail_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_first_detail {
                token.cancel();
            }
            let likes = self
                .details
                .iter()
                .find(|(id, _)| id == &stub.id)
                .and_then(|(_, likes)| *likes);
            match likes {
                Some(likes) => Ok(detail_payload(&stub.id, likes)),
                None => Err(AppError::business(
                    format!("detail for note {}", stub.id),
                    "mock failure",
                )),
            }
        }
    }

    fn fast_pacing() -> CrawlerConfig {
        CrawlerConfig {
            page_delay_ms: 0,
            detail_delay_ms: 0,
            ..CrawlerConfig::default()
        }
    }

    fn normalizer() -> Normalizer {
        Normalizer::new(&EndpointConfig::default())
    }

    #[tokio::test]
    async fn test_single_item_failure_does_not_abort_run() {
        let api = MockApi::new(vec![
            ("n1", Some(100)),
            ("n2", Some(100)),
            ("n3", None),
            ("n4", Some(100)),
            ("n5", Some(100)),
        ]);
        let query = SearchQuery::new("durian", 5);

        let outcome =
            run_crawl(&api, &normalizer(), &query, &fast_pacing(), &CancelToken::new()).await;

        let kept: Vec<&str> = outcome.records.iter().map(|r| r.note_id.as_str()).collect();
        assert_eq!(kept, vec!["n1", "n2", "n4", "n5"]);
        assert_eq!(outcome.summary.item_errors, 1);
        assert_eq!(outcome.summary.details_fetched, 4);
        assert_eq!(outcome.summary.message, "completed with 1 skipped");
        assert!(outcome.summary.first_error.is_some());
    }

    #[tokio::test]
    async fn test_engagement_filter_end_to_end() {
        let api = MockApi::new(vec![("n1", Some(5)), ("n2", Some(15))]);
        let mut query = SearchQuery::new("durian", 2);
        query.min_likes = 10;

        let outcome =
            run_crawl(&api, &normalizer(), &query, &fast_pacing(), &CancelToken::new()).await;

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].note_id, "n2");
        // Filtered-out records are not errors.
        assert_eq!(outcome.summary.item_errors, 0);
        assert_eq!(outcome.summary.message, "completed");
        assert_eq!(outcome.summary.records_kept, 1);
    }

    #[tokio::test]
    async fn test_search_failure_is_fatal() {
        let mut api = MockApi::new(vec![]);
        api.fail_search = true;
        let query = SearchQuery::new("durian", 5);

        let outcome =
            run_crawl(&api, &normalizer(), &query, &fast_pacing(), &CancelToken::new()).await;

        assert!(outcome.records.is_empty());
        assert!(outcome.summary.message.starts_with("failed at search stage:"));
        assert_eq!(outcome.summary.details_fetched, 0);
    }

    #[tokio::test]
    async fn test_invalid_query_is_fatal() {
        let api = MockApi::new(vec![("n1", Some(1))]);
        let query = SearchQuery::new("durian", 0);

        let outcome =
            run_crawl(&api, &normalizer(), &query, &fast_pacing(), &CancelToken::new()).await;

        assert!(outcome.records.is_empty());
        assert!(outcome.summary.message.starts_with("failed at search stage:"));
        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_stops_between_items() {
        let mut api = MockApi::new(vec![
            ("n1", Some(100)),
            ("n2", Some(100)),
            ("n3", Some(100)),
        ]);
        let cancel = CancelToken::new();
        api.cancel_on_first_detail = Some(cancel.clone());
        let query = SearchQuery::new("durian", 3);

        let outcome = run_crawl(&api, &normalizer(), &query, &fast_pacing(), &cancel).await;

        assert_eq!(api.detail_calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.summary.message.starts_with("cancelled"));
    }

    #[tokio::test]
    async fn test_spawned_run_can_be_cancelled() {
        let api = Arc::new(MockApi::new(vec![("n1", Some(100))]));
        let handle = spawn_crawl(
            api,
            normalizer(),
            SearchQuery::new("durian", 1),
            fast_pacing(),
        );
        // The spawned task has not polled yet on the current-thread runtime.
        handle.cancel();

        let outcome = handle.join().await;
        assert!(outcome.summary.message.starts_with("cancelled"));
        assert!(outcome.records.is_empty());
    }
}
