use serde::{Deserialize, Serialize};

use crate::domain::ShortKey;

/// Body of `POST {base}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlRequest {
    pub long_url: String,
    /// Always present on the wire; `null` when the user asked for a generated key.
    #[serde(default)]
    pub custom_key: Option<String>,
}

impl CreateUrlRequest {
    pub fn new(long_url: impl Into<String>, custom_key: Option<String>) -> Self {
        Self {
            long_url: long_url.into(),
            custom_key,
        }
    }

    /// Builds a request from the two form fields. An empty custom key means
    /// "let the backend pick", so it maps to `None` rather than `Some("")`.
    pub fn from_inputs(long_url: &str, custom_key: &str) -> Self {
        let custom_key = if custom_key.is_empty() {
            None
        } else {
            Some(custom_key.to_string())
        };
        Self::new(long_url, custom_key)
    }
}

/// A shortened URL as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenedUrlRecord {
    pub short_key: ShortKey,
    pub long_url: String,
    pub short_url: String,
    /// ISO-8601 timestamp, display only.
    pub created_at: String,
}
