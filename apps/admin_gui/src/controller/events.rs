//! UI/backend events and error modeling for the admin panel.

use client_core::{Action, ClientError, ViewState};
use shared::{domain::ShortKey, protocol::ShortenedUrlRecord};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    StateChanged(ViewState),
    InputsCleared,
    ListSynced,
    Created(ShortenedUrlRecord),
    Deleted(ShortKey),
    Resolved { short_key: ShortKey, long_url: String },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Transport,
    NotFound,
    Rejected,
    Server,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Create,
    Delete,
    Refresh,
    Resolve,
}

impl UiErrorContext {
    pub fn label(self) -> &'static str {
        match self {
            UiErrorContext::BackendStartup => "Backend startup",
            UiErrorContext::Create => "Create",
            UiErrorContext::Delete => "Delete",
            UiErrorContext::Refresh => "Refresh",
            UiErrorContext::Resolve => "Resolve",
        }
    }
}

impl From<Action> for UiErrorContext {
    fn from(action: Action) -> Self {
        match action {
            Action::Create => UiErrorContext::Create,
            Action::Delete => UiErrorContext::Delete,
            Action::Refresh => UiErrorContext::Refresh,
            Action::Resolve => UiErrorContext::Resolve,
        }
    }
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client_error(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Transport { .. } => UiErrorCategory::Transport,
            ClientError::Remote { status: 404, .. } => UiErrorCategory::NotFound,
            ClientError::Remote { status, .. } if (400..500).contains(status) => {
                UiErrorCategory::Rejected
            }
            ClientError::Remote { status, .. } if *status >= 500 => UiErrorCategory::Server,
            ClientError::Remote { .. } => UiErrorCategory::Unknown,
        };

        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let message_lower = message.to_ascii_lowercase();
        let category = if message_lower.contains("timeout")
            || message_lower.contains("timed out")
            || message_lower.contains("connection")
            || message_lower.contains("network")
            || message_lower.contains("transport")
            || message_lower.contains("disconnect")
        {
            UiErrorCategory::Transport
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    /// Failures that leave the panel out of date get a banner, not just a status line.
    pub fn surfaces_banner(&self) -> bool {
        !matches!(self.context, UiErrorContext::Resolve)
    }

    pub fn user_message(&self) -> String {
        match self.category {
            UiErrorCategory::Transport => format!(
                "Backend unreachable; check the base URL/network and retry. ({})",
                self.message
            ),
            UiErrorCategory::NotFound => format!("Short key not found. ({})", self.message),
            UiErrorCategory::Rejected => {
                format!("Backend rejected the request. ({})", self.message)
            }
            UiErrorCategory::Server => format!("Backend failed. ({})", self.message),
            UiErrorCategory::Unknown => self.message.clone(),
        }
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: u16) -> ClientError {
        ClientError::Remote {
            status,
            message: "boom".to_string(),
        }
    }

    #[test]
    fn classifies_client_errors_by_status() {
        let cases = [
            (ClientError::transport("connection refused"), UiErrorCategory::Transport),
            (remote(404), UiErrorCategory::NotFound),
            (remote(409), UiErrorCategory::Rejected),
            (remote(400), UiErrorCategory::Rejected),
            (remote(503), UiErrorCategory::Server),
            (remote(302), UiErrorCategory::Unknown),
        ];
        for (err, expected) in cases {
            assert_eq!(
                UiError::from_client_error(UiErrorContext::Create, &err).category(),
                expected,
                "{err}"
            );
        }
    }

    #[test]
    fn classifies_worker_disconnect_message_as_transport() {
        let err = UiError::from_message(
            UiErrorContext::BackendStartup,
            "Backend worker disconnected (possible startup/runtime failure)",
        );
        assert_eq!(err.category(), UiErrorCategory::Transport);
        assert!(err.surfaces_banner());
    }

    #[test]
    fn resolve_failures_stay_out_of_the_banner() {
        let err = UiError::from_client_error(UiErrorContext::Resolve, &remote(404));
        assert!(!err.surfaces_banner());
        assert!(UiError::from_client_error(UiErrorContext::Delete, &remote(404)).surfaces_banner());
    }

    #[test]
    fn maps_controller_actions_to_contexts() {
        assert_eq!(UiErrorContext::from(Action::Refresh), UiErrorContext::Refresh);
        assert_eq!(UiErrorContext::from(Action::Delete), UiErrorContext::Delete);
    }
}
