// src/services/normalize.rs

//! Raw detail payload normalization.
//!
//! Turns one feed payload into a canonical [`NoteRecord`]. A record is only
//! dropped when the payload lacks its top-level shape (note type or the
//! interaction block); any other missing field defaults to empty/zero.

use chrono::{Local, TimeZone};
use serde_json::Value;

use crate::models::{EndpointConfig, NoteKind, NoteRecord};
use crate::utils::num::parse_count;

/// Title used when the source title is blank.
const UNTITLED: &str = "无标题";

/// Converts raw feed payloads into canonical records.
#[derive(Debug, Clone)]
pub struct Normalizer {
    user_base: String,
    video_cdn: String,
}

impl Normalizer {
    pub fn new(endpoints: &EndpointConfig) -> Self {
        Self {
            user_base: endpoints.user_base.clone(),
            video_cdn: endpoints.video_cdn.clone(),
        }
    }

    /// Normalize one detail payload, or `None` when it is unusable.
    pub fn normalize(&self, raw: &Value) -> Option<NoteRecord> {
        let card = raw.get("note_card")?;
        let type_tag = card.get("type").and_then(Value::as_str)?;
        let interact = card.get("interact_info")?;

        // Everything that is not an image set is a video.
        let kind = if type_tag == "normal" {
            NoteKind::ImageSet
        } else {
            NoteKind::Video
        };

        let image_list = extract_images(card);
        let (video_cover, video_addr) = if kind == NoteKind::Video {
            (
                image_list.first().cloned(),
                card.pointer("/video/consumer/origin_video_key")
                    .and_then(Value::as_str)
                    .map(|key| format!("{}/{}", self.video_cdn, key)),
            )
        } else {
            (None, None)
        };

        let user_id = text(card.pointer("/user/user_id"));
        let home_url = if user_id.is_empty() {
            String::new()
        } else {
            format!("{}/{}", self.user_base, user_id)
        };

        let title = text(card.get("title"));
        let title = title.trim();
        let title = if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title.to_string()
        };

        Some(NoteRecord {
            note_id: text(raw.get("id")),
            note_url: text(raw.get("url")),
            kind,
            user_id,
            nickname: text(card.pointer("/user/nickname")),
            avatar: text(card.pointer("/user/avatar")),
            home_url,
            title,
            desc: text(card.get("desc")),
            liked_count: counter(interact, "liked_count"),
            collected_count: counter(interact, "collected_count"),
            comment_count: counter(interact, "comment_count"),
            share_count: counter(interact, "share_count"),
            video_cover,
            video_addr,
            image_list,
            tags: extract_tags(card),
            upload_time: card
                .get("time")
                .and_then(Value::as_i64)
                .map(format_upload_time)
                .unwrap_or_default(),
            ip_location: text(card.get("ip_location")),
        })
    }
}

fn text(value: Option<&Value>) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn counter(interact: &Value, key: &str) -> u64 {
    interact.get(key).map(parse_count).unwrap_or(0)
}

/// Second resolution variant of each image entry; entries without one are
/// skipped.
fn extract_images(card: &Value) -> Vec<String> {
    card.get("image_list")
        .and_then(Value::as_array)
        .map(|images| {
            images
                .iter()
                .filter_map(|image| {
                    image
                        .pointer("/info_list/1/url")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default()
}

fn extract_tags(card: &Value) -> Vec<String> {
    card.get("tag_list")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| tag.get("name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Render epoch milliseconds as local calendar time.
fn format_upload_time(ms: i64) -> String {
    Local
        .timestamp_millis_opt(ms)
        .single()
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}
