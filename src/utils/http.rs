// src/utils/http.rs

//! HTTP client utilities.
//!
//! One configured client is shared by all requests within a run; every
//! request goes out through [`send_envelope`] and comes back as the
//! platform's `{success, msg, data}` wrapper.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, COOKIE, HeaderMap, HeaderValue, REFERER};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::CrawlerConfig;
use crate::services::SignedHeaders;

/// JSON wrapper returned by both the search and feed endpoints.
///
/// `success: false` is a normal value inspected by the caller, never a
/// transport error.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: bool,

    #[serde(default)]
    pub msg: String,

    #[serde(default)]
    pub data: Value,
}

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("zh-CN,zh;q=0.9"));
    headers.insert(REFERER, HeaderValue::from_static("https://www.xiaohongshu.com/"));

    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Issue one signed request and decode the response envelope.
///
/// Network failures, non-2xx statuses, and malformed JSON bodies all
/// surface as [`AppError::Transport`].
pub async fn send_envelope(
    client: &reqwest::Client,
    url: &str,
    signed: &SignedHeaders,
    cookie_header: &str,
    body: Option<&Value>,
    method: Method,
) -> Result<Envelope> {
    if signed.is_degraded() {
        log::warn!("sending unsigned request to {url}; the platform will likely reject it");
    }

    let mut request = if method == Method::POST {
        client.post(url)
    } else {
        client.get(url)
    };

    request = request
        .header("x-t", signed.timestamp.to_string())
        .header("x-b3-traceid", &signed.trace_id);
    if let Some(signature) = &signed.signature {
        request = request.header("x-s", signature);
    }
    if let Some(common) = &signed.common {
        request = request.header("x-s-common", common);
    }
    if !cookie_header.is_empty() {
        request = request.header(COOKIE, cookie_header);
    }
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| AppError::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(AppError::transport(url, format!("HTTP status {status}")));
    }

    response
        .json::<Envelope>()
        .await
        .map_err(|e| AppError::transport(url, format!("malformed JSON body: {e}")))
}
