use shared::error::BackendErrorBody;
use thiserror::Error;

/// Failure of a single API round trip.
///
/// Transport problems (unreachable host, timeout, undecodable body) and
/// non-2xx answers are the only two shapes callers need to tell apart.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("transport failure: {reason}")]
    Transport { reason: String },
    #[error("backend returned {status}: {message}")]
    Remote { status: u16, message: String },
}

impl ClientError {
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Builds a `Remote` error from a status code and whatever body came back.
    pub fn remote(status: reqwest::StatusCode, raw_body: &str) -> Self {
        let message = BackendErrorBody::parse(raw_body)
            .map(|body| body.describe())
            .filter(|message| !message.is_empty())
            .or_else(|| {
                let trimmed = raw_body.trim();
                (!trimmed.is_empty() && trimmed.len() <= 200).then(|| trimmed.to_string())
            })
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected status")
                    .to_string()
            });
        Self::Remote {
            status: status.as_u16(),
            message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Remote { status, .. } => Some(*status),
            Self::Transport { .. } => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::transport(format!("malformed response: {err}"));
        }
        if err.is_timeout() {
            return Self::transport(format!("request timed out: {err}"));
        }
        if err.is_connect() {
            return Self::transport(format!("failed to connect: {err}"));
        }
        Self::transport(err.to_string())
    }
}
