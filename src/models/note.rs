//! Note data structures.

use serde::{Deserialize, Serialize};

/// Minimal search-result reference, consumed once by the detail fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemStub {
    /// Note identifier
    pub id: String,

    /// Opaque access token issued by the search response
    pub xsec_token: String,

    /// Provenance tag from the search response (e.g. "note", "rec_query")
    pub model_type: String,
}

impl ItemStub {
    /// Whether this stub refers to an actual note rather than an inline
    /// recommendation or ad slot.
    pub fn is_note(&self) -> bool {
        self.model_type == "note"
    }
}

/// Kind of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    ImageSet,
    Video,
}

/// Canonical output record for one note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteRecord {
    /// Note identifier
    pub note_id: String,

    /// Canonical note page URL
    pub note_url: String,

    /// Image set or video
    pub kind: NoteKind,

    /// Author identifier
    pub user_id: String,

    /// Author display name
    pub nickname: String,

    /// Author avatar URL
    pub avatar: String,

    /// Author profile page URL
    pub home_url: String,

    /// Note title ("无标题" when the source title is blank)
    pub title: String,

    /// Note description
    pub desc: String,

    /// Like count
    pub liked_count: u64,

    /// Collect count
    pub collected_count: u64,

    /// Comment count
    pub comment_count: u64,

    /// Share count
    pub share_count: u64,

    /// Video cover URL (video notes only)
    pub video_cover: Option<String>,

    /// Video address URL (video notes only, when the origin key is present)
    pub video_addr: Option<String>,

    /// Image URLs
    pub image_list: Vec<String>,

    /// Tag names
    pub tags: Vec<String>,

    /// Upload time rendered as `YYYY-MM-DD HH:MM:SS` local time
    pub upload_time: String,

    /// IP location string (empty when absent)
    pub ip_location: String,
}

impl NoteRecord {
    /// Engagement filter predicate.
    ///
    /// Thresholds are exclusive floors: a note passes only with strictly
    /// more likes or strictly more collects than the configured minimum.
    pub fn passes_engagement(&self, min_likes: u64, min_collects: u64) -> bool {
        self.liked_count > min_likes || self.collected_count > min_collects
    }
}
