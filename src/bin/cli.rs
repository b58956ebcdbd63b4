//! rednote-crawler CLI
//!
//! Local execution entry point. Search results and the run summary are
//! reported on stdout; the cookie comes from `--cookie` or the
//! `REDNOTE_COOKIE` environment variable.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rednote_crawler::{
    error::{AppError, Result},
    models::{Config, NoteTypeFilter, SearchQuery, SortMode},
    pipeline::{CancelToken, run_crawl},
    services::{NativeSigner, Normalizer, XhsApi},
};

/// rednote-crawler - High-engagement note crawler
#[derive(Parser, Debug)]
#[command(
    name = "rednote-crawler",
    version,
    about = "Crawls rednote search results for high-engagement notes"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search notes for a keyword and keep the high-engagement ones
    Crawl {
        /// Search keyword
        #[arg(short, long)]
        keyword: String,

        /// Number of search results to collect
        #[arg(short = 'n', long, default_value_t = 30)]
        count: usize,

        /// Sort mode: relevance, recency, most-liked, most-commented, most-collected
        #[arg(long, default_value = "relevance")]
        sort: String,

        /// Note type: any, video, image-set
        #[arg(long, default_value = "any")]
        note_type: String,

        /// Keep notes with strictly more likes than this
        #[arg(long, default_value_t = 0)]
        min_likes: u64,

        /// Keep notes with strictly more collects than this
        #[arg(long, default_value_t = 0)]
        min_collects: u64,

        /// Raw cookie string (falls back to REDNOTE_COOKIE)
        #[arg(long)]
        cookie: Option<String>,

        /// Print kept records as a JSON array on stdout
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration file
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config);

    match cli.command {
        Command::Crawl {
            keyword,
            count,
            sort,
            note_type,
            min_likes,
            min_collects,
            cookie,
            json,
        } => {
            let cookie = cookie
                .or_else(|| std::env::var("REDNOTE_COOKIE").ok())
                .unwrap_or_default();
            if cookie.trim().is_empty() {
                log::error!(
                    "No cookie supplied. Pass --cookie or set REDNOTE_COOKIE; \
                     the platform rejects anonymous requests."
                );
                return Err(AppError::config("missing cookie"));
            }

            let mut query = SearchQuery::new(keyword, count);
            query.sort = SortMode::parse_or_default(&sort);
            query.note_type = NoteTypeFilter::parse_or_default(&note_type);
            query.min_likes = min_likes;
            query.min_collects = min_collects;
            query.validate()?;

            let config = Arc::new(config);
            let api = XhsApi::new(Arc::clone(&config), &cookie, Box::new(NativeSigner::new()))?;
            let normalizer = Normalizer::new(&config.endpoints);

            let outcome = run_crawl(
                &api,
                &normalizer,
                &query,
                &config.crawler,
                &CancelToken::new(),
            )
            .await;

            let summary = &outcome.summary;
            log::info!("stubs found:      {}", summary.items_seen);
            log::info!("details fetched:  {}", summary.details_fetched);
            log::info!("records kept:     {}", summary.records_kept);
            log::info!("items skipped:    {}", summary.item_errors);
            if let Some(error) = &summary.first_error {
                log::warn!("first error:      {}", error);
            }
            log::info!("status:           {}", summary.message);

            for record in outcome.records.iter().take(3) {
                log::info!(
                    "  {} (likes {}, collects {})",
                    record.title,
                    record.liked_count,
                    record.collected_count
                );
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&outcome.records)?);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            log::info!("✓ Config OK (endpoints and pacing)");
        }
    }

    Ok(())
}
