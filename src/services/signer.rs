// src/services/signer.rs

//! Request signing.
//!
//! The platform requires a signature header derived from the request path,
//! body, and method. The derivation lives behind the [`Signer`] trait so the
//! algorithm can be swapped without touching the pipeline; [`NativeSigner`]
//! is the one conforming implementation shipped with the crate.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use rand::Rng;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// Signature scheme version tag mixed into the secondary token.
const SCHEME_VERSION: &str = "2.0";

/// Prefix the platform expects on the primary signature.
const SIGNATURE_PREFIX: &str = "XYW_";

/// Alphabet for trace identifiers (lowercase alphanumeric).
const TRACE_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Default trace identifier length.
pub const TRACE_ID_LEN: usize = 16;

/// Length of the search-session identifier.
pub const SEARCH_SESSION_LEN: usize = 21;

/// Generate a random lowercase-alphanumeric identifier.
pub fn trace_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| TRACE_ALPHABET[rng.gen_range(0..TRACE_ALPHABET.len())] as char)
        .collect()
}

/// Authentication headers for one request.
///
/// A degraded set (no signature) means derivation failed; the request may
/// still be sent but the platform will likely reject it.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    /// Primary signature (`x-s`), absent when degraded
    pub signature: Option<String>,

    /// Secondary token (`x-s-common`), absent when degraded
    pub common: Option<String>,

    /// Epoch milliseconds (`x-t`)
    pub timestamp: i64,

    /// Per-request trace identifier (`x-b3-traceid`)
    pub trace_id: String,
}

impl SignedHeaders {
    /// Header set without a signature, for when derivation failed.
    pub fn degraded(timestamp: i64) -> Self {
        Self {
            signature: None,
            common: None,
            timestamp,
            trace_id: trace_id(TRACE_ID_LEN),
        }
    }

    /// Whether this header set lacks a signature.
    pub fn is_degraded(&self) -> bool {
        self.signature.is_none()
    }
}

/// Produces the authentication headers the platform requires.
pub trait Signer: Send + Sync {
    /// Sign a request. Must not fail: implementations return a degraded
    /// header set when the signature cannot be derived.
    fn sign(&self, path: &str, body: Option<&serde_json::Value>, method: &str) -> SignedHeaders;
}

/// Native port of the signing algorithm.
///
/// Deterministic given identical inputs and timestamp; randomness is
/// confined to the trace identifier.
#[derive(Debug, Default)]
pub struct NativeSigner;

impl NativeSigner {
    pub fn new() -> Self {
        Self
    }

    /// Derive the signature pair at a fixed timestamp.
    fn derive(
        path: &str,
        body: Option<&serde_json::Value>,
        method: &str,
        timestamp: i64,
    ) -> Result<(String, String)> {
        let payload = body.map(serde_json::to_string).transpose()?.unwrap_or_default();

        let digest = Sha256::digest(format!("{method}{path}{payload}{timestamp}").as_bytes());
        let signature = format!("{SIGNATURE_PREFIX}{}", BASE64.encode(digest));

        let common = hex::encode(Sha256::digest(
            format!("{path}|{SCHEME_VERSION}|{signature}|0").as_bytes(),
        ));

        Ok((signature, common))
    }
}

impl Signer for NativeSigner {
    fn sign(&self, path: &str, body: Option<&serde_json::Value>, method: &str) -> SignedHeaders {
        let timestamp = Utc::now().timestamp_millis();
        match Self::derive(path, body, method, timestamp) {
            Ok((signature, common)) => SignedHeaders {
                signature: Some(signature),
                common: Some(common),
                timestamp,
                trace_id: trace_id(TRACE_ID_LEN),
            },
            Err(e) => {
                log::warn!("signature derivation failed for {path}: {e}");
                SignedHeaders::degraded(timestamp)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trace_id_shape() {
        let id = trace_id(TRACE_ID_LEN);
        assert_eq!(id.len(), 16);
        assert!(id.bytes().all(|b| TRACE_ALPHABET.contains(&b)));

        assert_eq!(trace_id(SEARCH_SESSION_LEN).len(), 21);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let body = json!({"keyword": "durian"});
        let a = NativeSigner::derive("/api/x", Some(&body), "POST", 1_700_000_000_000).unwrap();
        let b = NativeSigner::derive("/api/x", Some(&body), "POST", 1_700_000_000_000).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_derivation_varies_with_inputs() {
        let body = json!({"keyword": "durian"});
        let base = NativeSigner::derive("/api/x", Some(&body), "POST", 1).unwrap();
        assert_ne!(
            base,
            NativeSigner::derive("/api/y", Some(&body), "POST", 1).unwrap()
        );
        assert_ne!(
            base,
            NativeSigner::derive("/api/x", Some(&body), "GET", 1).unwrap()
        );
        assert_ne!(
            base,
            NativeSigner::derive("/api/x", None, "POST", 1).unwrap()
        );
    }

    #[test]
    fn test_signed_headers_carry_signature() {
        let headers = NativeSigner::new().sign("/api/x", None, "GET");
        assert!(!headers.is_degraded());
        assert!(headers.signature.as_deref().unwrap().starts_with("XYW_"));
        assert_eq!(headers.trace_id.len(), 16);
        assert!(headers.timestamp > 0);
    }

    #[test]
    fn test_degraded_headers() {
        let headers = SignedHeaders::degraded(42);
        assert!(headers.is_degraded());
        assert!(headers.common.is_none());
        assert_eq!(headers.timestamp, 42);
    }
}
