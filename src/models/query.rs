//! Search query parameters and platform token mappings.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Sort order for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Relevance,
    Recency,
    MostLiked,
    MostCommented,
    MostCollected,
}

impl SortMode {
    /// Platform token sent in the search request body.
    pub fn as_token(self) -> &'static str {
        match self {
            SortMode::Relevance => "general",
            SortMode::Recency => "time_descending",
            SortMode::MostLiked => "popularity_descending",
            SortMode::MostCommented => "comment_descending",
            SortMode::MostCollected => "collect_descending",
        }
    }

    /// Parse a user-supplied name. Unrecognized names fall back to relevance.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "recency" | "latest" | "time" => SortMode::Recency,
            "most-liked" | "likes" => SortMode::MostLiked,
            "most-commented" | "comments" => SortMode::MostCommented,
            "most-collected" | "collects" => SortMode::MostCollected,
            _ => SortMode::Relevance,
        }
    }
}

/// Note type restriction for search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteTypeFilter {
    #[default]
    Any,
    Video,
    ImageSet,
}

impl NoteTypeFilter {
    /// Platform filter tag sent in the search request body.
    pub fn as_token(self) -> &'static str {
        match self {
            NoteTypeFilter::Any => "不限",
            NoteTypeFilter::Video => "视频笔记",
            NoteTypeFilter::ImageSet => "普通笔记",
        }
    }

    /// Parse a user-supplied name. Unrecognized names fall back to `Any`.
    pub fn parse_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "video" => NoteTypeFilter::Video,
            "image-set" | "image" | "normal" => NoteTypeFilter::ImageSet,
            _ => NoteTypeFilter::Any,
        }
    }
}

/// Parameters for one crawl run. Immutable once the run starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Search keyword
    pub keyword: String,

    /// Number of note stubs to collect from search
    pub target_count: usize,

    /// Sort order
    #[serde(default)]
    pub sort: SortMode,

    /// Note type restriction
    #[serde(default)]
    pub note_type: NoteTypeFilter,

    /// Keep notes with strictly more likes than this
    #[serde(default)]
    pub min_likes: u64,

    /// Keep notes with strictly more collects than this
    #[serde(default)]
    pub min_collects: u64,
}

impl SearchQuery {
    /// Create a query for a keyword with default sort, type, and thresholds.
    pub fn new(keyword: impl Into<String>, target_count: usize) -> Self {
        Self {
            keyword: keyword.into(),
            target_count,
            sort: SortMode::default(),
            note_type: NoteTypeFilter::default(),
            min_likes: 0,
            min_collects: 0,
        }
    }

    /// Validate run parameters before starting a crawl.
    pub fn validate(&self) -> Result<()> {
        if self.keyword.trim().is_empty() {
            return Err(AppError::validation("keyword is empty"));
        }
        if self.target_count == 0 {
            return Err(AppError::validation("target_count must be > 0"));
        }
        Ok(())
    }
}
