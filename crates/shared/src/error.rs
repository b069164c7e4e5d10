use serde::{Deserialize, Serialize};

/// Error payload produced by the shortener backend's exception handler.
///
/// Both fields are optional: some failures (e.g. a bare `400` from the
/// controller) come back with an empty body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl BackendErrorBody {
    /// Lenient decode; anything that is not the expected JSON object yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let body: Self = serde_json::from_str(raw).ok()?;
        if body.error.is_none() && body.message.is_none() {
            return None;
        }
        Some(body)
    }

    pub fn describe(&self) -> String {
        match (&self.error, &self.message) {
            (Some(error), Some(message)) => format!("{error}: {message}"),
            (Some(error), None) => error.clone(),
            (None, Some(message)) => message.clone(),
            (None, None) => String::new(),
        }
    }
}
