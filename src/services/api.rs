// src/services/api.rs

//! Platform API client.
//!
//! Builds signed requests against the search and feed endpoints. The
//! [`NoteApi`] trait is the seam between the pipeline and the network;
//! [`XhsApi`] is the real client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Config, ItemStub, SearchQuery};
use crate::services::signer::{SEARCH_SESSION_LEN, Signer, trace_id};
use crate::utils::cookies;
use crate::utils::http;

/// Search endpoint path.
const SEARCH_PATH: &str = "/api/sns/web/v1/search/notes";

/// Note detail (feed) endpoint path.
const FEED_PATH: &str = "/api/sns/web/v1/feed";

/// Fixed number of items requested per search page.
pub const PAGE_SIZE: usize = 20;

/// One page of search results.
#[derive(Debug, Default)]
pub struct SearchPage {
    /// All stubs on the page, including non-note entries
    pub stubs: Vec<ItemStub>,

    /// Whether the platform declares further pages
    pub has_more: bool,
}

/// Access to the platform's search and detail endpoints.
#[async_trait]
pub trait NoteApi: Send + Sync {
    /// Fetch one page of search results (pages start at 1).
    async fn search_page(&self, query: &SearchQuery, page: u32) -> Result<SearchPage>;

    /// Fetch the raw detail payload for one stub.
    async fn note_detail(&self, stub: &ItemStub) -> Result<Value>;
}

/// Signed HTTP client for the rednote web API.
pub struct XhsApi {
    client: reqwest::Client,
    signer: Box<dyn Signer>,
    cookie_header: String,
    config: Arc<Config>,
}

impl XhsApi {
    /// Create a client from configuration, a raw cookie string, and a signer.
    pub fn new(config: Arc<Config>, cookie_str: &str, signer: Box<dyn Signer>) -> Result<Self> {
        let client = http::create_async_client(&config.crawler)?;
        let cookie_header = cookies::cookie_header(&cookies::parse_cookie_str(cookie_str));
        Ok(Self {
            client,
            signer,
            cookie_header,
            config,
        })
    }

    /// Canonical note page URL for a stub.
    pub fn note_url(&self, stub: &ItemStub) -> String {
        let base = format!("{}/{}", self.config.endpoints.explore_base, stub.id);
        match Url::parse_with_params(&base, [("xsec_token", stub.xsec_token.as_str())]) {
            Ok(url) => url.to_string(),
            Err(_) => base,
        }
    }

    async fn post_signed(&self, path: &str, body: &Value) -> Result<http::Envelope> {
        let signed = self.signer.sign(path, Some(body), Method::POST.as_str());
        let url = format!("{}{}", self.config.endpoints.api_base, path);
        http::send_envelope(
            &self.client,
            &url,
            &signed,
            &self.cookie_header,
            Some(body),
            Method::POST,
        )
        .await
    }
}

#[async_trait]
impl NoteApi for XhsApi {
    async fn search_page(&self, query: &SearchQuery, page: u32) -> Result<SearchPage> {
        let body = json!({
            "keyword": query.keyword,
            "page": page,
            "page_size": PAGE_SIZE,
            "search_id": trace_id(SEARCH_SESSION_LEN),
            "sort": query.sort.as_token(),
            "note_type": 0,
            "ext_flags": [],
            "filters": [
                {"tags": [query.sort.as_token()], "type": "sort_type"},
                {"tags": [query.note_type.as_token()], "type": "filter_note_type"},
                {"tags": ["不限"], "type": "filter_note_time"},
                {"tags": ["不限"], "type": "filter_note_range"},
                {"tags": ["不限"], "type": "filter_pos_distance"},
            ],
            "geo": "",
            "image_formats": ["jpg", "webp", "avif"],
        });

        let envelope = self.post_signed(SEARCH_PATH, &body).await?;
        if !envelope.success {
            return Err(AppError::business("search", platform_msg(&envelope.msg)));
        }

        let stubs = envelope
            .data
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(parse_stub).collect())
            .unwrap_or_default();
        let has_more = envelope
            .data
            .get("has_more")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Ok(SearchPage { stubs, has_more })
    }

    async fn note_detail(&self, stub: &ItemStub) -> Result<Value> {
        let body = json!({
            "source_note_id": stub.id,
            "image_formats": ["jpg", "webp", "avif"],
            "extra": {"need_body_topic": "1"},
            "xsec_source": "pc_search",
            "xsec_token": stub.xsec_token,
        });

        let envelope = self.post_signed(FEED_PATH, &body).await?;
        if !envelope.success {
            return Err(AppError::business(
                format!("detail for note {}", stub.id),
                platform_msg(&envelope.msg),
            ));
        }

        let mut item = envelope
            .data
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
            .cloned()
            .ok_or_else(|| {
                AppError::business(
                    format!("detail for note {}", stub.id),
                    "empty item list in feed response",
                )
            })?;

        // Splice the canonical URL in so the normalizer can carry it through.
        if let Some(object) = item.as_object_mut() {
            object.insert("url".to_string(), Value::String(self.note_url(stub)));
        }
        Ok(item)
    }
}

fn parse_stub(item: &Value) -> Option<ItemStub> {
    let id = item.get("id").and_then(Value::as_str)?;
    Some(ItemStub {
        id: id.to_string(),
        xsec_token: item
            .get("xsec_token")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        model_type: item
            .get("model_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
    })
}

fn platform_msg(msg: &str) -> &str {
    if msg.is_empty() { "unknown error" } else { msg }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::NativeSigner;
    use serde_json::json;

    #[test]
    fn test_parse_stub() {
        let stub = parse_stub(&json!({
            "id": "64b0f0",
            "xsec_token": "ABtok=",
            "model_type": "note",
        }))
        .unwrap();
        assert_eq!(stub.id, "64b0f0");
        assert_eq!(stub.xsec_token, "ABtok=");
        assert!(stub.is_note());
    }

    #[test]
    fn test_parse_stub_requires_id() {
        assert!(parse_stub(&json!({"model_type": "note"})).is_none());
    }

    #[test]
    fn test_note_url_encodes_token() {
        let api = XhsApi::new(
            Arc::new(Config::default()),
            "a=1",
            Box::new(NativeSigner::new()),
        )
        .unwrap();
        let stub = ItemStub {
            id: "64b0f0".into(),
            xsec_token: "AB/tok=".into(),
            model_type: "note".into(),
        };
        let url = api.note_url(&stub);
        assert_eq!(
            url,
            "https://www.xiaohongshu.com/explore/64b0f0?xsec_token=AB%2Ftok%3D"
        );
    }
}
