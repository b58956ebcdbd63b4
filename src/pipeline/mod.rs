//! Pipeline entry points for crawler operations.
//!
//! - `run_crawl`: Execute one search → detail → normalize → filter run
//! - `spawn_crawl`: Run the same pipeline on the runtime behind a [`RunHandle`]

pub mod crawl;
mod handle;

pub use crawl::{CrawlOutcome, RunSummary, run_crawl, spawn_crawl};
pub use handle::{CancelToken, RunHandle};
