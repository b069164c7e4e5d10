use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::ShortKey,
    protocol::{CreateUrlRequest, ShortenedUrlRecord},
};
use tracing::{debug, warn};
use url::Url;

pub mod config;
pub mod controller;
pub mod error;

pub use config::{load_settings, AdminSettings, ConfigError, DEFAULT_BASE_URL};
pub use controller::{
    Action, ActionOutcome, AdminController, ControllerEvent, ControllerPhase, Intent, ViewState,
};
pub use error::ClientError;

/// The four backend operations the admin panel depends on.
#[async_trait]
pub trait UrlApi: Send + Sync {
    async fn create(&self, request: &CreateUrlRequest) -> Result<ShortenedUrlRecord, ClientError>;
    async fn list(&self) -> Result<Vec<ShortenedUrlRecord>, ClientError>;
    async fn resolve(&self, short_key: &ShortKey) -> Result<String, ClientError>;
    async fn delete(&self, short_key: &ShortKey) -> Result<(), ClientError>;
}

#[async_trait]
impl<T> UrlApi for Arc<T>
where
    T: UrlApi + ?Sized,
{
    async fn create(&self, request: &CreateUrlRequest) -> Result<ShortenedUrlRecord, ClientError> {
        (**self).create(request).await
    }

    async fn list(&self) -> Result<Vec<ShortenedUrlRecord>, ClientError> {
        (**self).list().await
    }

    async fn resolve(&self, short_key: &ShortKey) -> Result<String, ClientError> {
        (**self).resolve(short_key).await
    }

    async fn delete(&self, short_key: &ShortKey) -> Result<(), ClientError> {
        (**self).delete(short_key).await
    }
}

const LIST_SEGMENT: &str = "urls";

/// HTTP implementation of [`UrlApi`] against `{base}`, `{base}/urls` and
/// `{base}/{shortKey}`.
///
/// One request per call; no retries and no timeout beyond reqwest's defaults.
#[derive(Debug, Clone)]
pub struct ShortenerClient {
    http: Client,
    base_url: Url,
}

impl ShortenerClient {
    pub fn new(base_url: Url) -> Self {
        Self::with_http_client(Client::new(), base_url)
    }

    pub fn with_http_client(http: Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    pub fn from_settings(settings: &AdminSettings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.base_url()?))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segment: &str) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                ClientError::transport(format!(
                    "base url '{}' cannot carry path segments",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .push(segment);
        Ok(url)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::remote(status, &body))
}

fn log_outcome<T>(method: &str, url: &Url, result: &Result<T, ClientError>) {
    match result {
        Ok(_) => debug!(method, %url, "shortener request succeeded"),
        Err(err) => warn!(method, %url, error = %err, "shortener request failed"),
    }
}

/// The backend answers resolve with a bare `text/plain` body; a JSON-encoded
/// string is accepted as well.
fn decode_resolved_url(body: &str) -> Result<String, ClientError> {
    if let Ok(decoded) = serde_json::from_str::<String>(body) {
        return Ok(decoded);
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(ClientError::transport(
            "malformed response: empty body for resolved url",
        ));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl UrlApi for ShortenerClient {
    async fn create(&self, request: &CreateUrlRequest) -> Result<ShortenedUrlRecord, ClientError> {
        let url = self.base_url.clone();
        let result = async {
            let response = self.http.post(url.clone()).json(request).send().await?;
            let record = ensure_success(response)
                .await?
                .json::<ShortenedUrlRecord>()
                .await?;
            Ok::<_, ClientError>(record)
        }
        .await;
        log_outcome("POST", &url, &result);
        result
    }

    async fn list(&self) -> Result<Vec<ShortenedUrlRecord>, ClientError> {
        let url = self.endpoint(LIST_SEGMENT)?;
        let result = async {
            let response = self.http.get(url.clone()).send().await?;
            let records = ensure_success(response)
                .await?
                .json::<Vec<ShortenedUrlRecord>>()
                .await?;
            Ok::<_, ClientError>(records)
        }
        .await;
        log_outcome("GET", &url, &result);
        result
    }

    async fn resolve(&self, short_key: &ShortKey) -> Result<String, ClientError> {
        let url = self.endpoint(short_key.as_str())?;
        let result = async {
            let response = self.http.get(url.clone()).send().await?;
            let body = ensure_success(response).await?.text().await?;
            decode_resolved_url(&body)
        }
        .await;
        log_outcome("GET", &url, &result);
        result
    }

    async fn delete(&self, short_key: &ShortKey) -> Result<(), ClientError> {
        let url = self.endpoint(short_key.as_str())?;
        let result = async {
            let response = self.http.delete(url.clone()).send().await?;
            ensure_success(response).await?;
            Ok::<_, ClientError>(())
        }
        .await;
        log_outcome("DELETE", &url, &result);
        result
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
