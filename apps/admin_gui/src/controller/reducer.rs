//! UI-thread state and the reducer that folds backend events into it.

use chrono::{DateTime, Local};
use client_core::ControllerPhase;
use shared::{domain::ShortKey, protocol::ShortenedUrlRecord};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiErrorCategory, UiEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBannerSeverity {
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub severity: StatusBannerSeverity,
    pub message: String,
}

pub fn err_label(category: UiErrorCategory) -> &'static str {
    match category {
        UiErrorCategory::Transport => "Transport",
        UiErrorCategory::NotFound => "Not found",
        UiErrorCategory::Rejected => "Rejected",
        UiErrorCategory::Server => "Backend",
        UiErrorCategory::Unknown => "Unexpected",
    }
}

/// Everything the panel renders. `urls` and `phase` mirror the backend
/// controller; the drafts are owned here until submitted.
#[derive(Debug, Clone)]
pub struct PanelState {
    pub long_url_draft: String,
    pub custom_key_draft: String,
    pub urls: Vec<ShortenedUrlRecord>,
    pub phase: ControllerPhase,
    pub status: String,
    pub status_banner: Option<StatusBanner>,
    pub last_resolved: Option<(ShortKey, String)>,
    pub last_synced_at: Option<DateTime<Local>>,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            long_url_draft: String::new(),
            custom_key_draft: String::new(),
            urls: Vec::new(),
            phase: ControllerPhase::Idle,
            status: "Connecting to backend".to_string(),
            status_banner: None,
            last_resolved: None,
            last_synced_at: None,
        }
    }
}

impl PanelState {
    pub fn create_command(&self) -> BackendCommand {
        BackendCommand::SubmitCreate {
            long_url: self.long_url_draft.clone(),
            custom_key: self.custom_key_draft.clone(),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.phase != ControllerPhase::Idle
    }

    pub fn dismiss_banner(&mut self) {
        self.status_banner = None;
    }
}

pub fn reduce(state: &mut PanelState, event: UiEvent, now: DateTime<Local>) {
    match event {
        UiEvent::Info(message) => {
            state.status = message;
        }
        UiEvent::StateChanged(view) => {
            state.phase = view.phase();
            state.urls = view.urls;
        }
        UiEvent::InputsCleared => {
            state.long_url_draft.clear();
            state.custom_key_draft.clear();
        }
        UiEvent::ListSynced => {
            state.last_synced_at = Some(now);
        }
        UiEvent::Created(record) => {
            state.status = format!("Created {} -> {}", record.short_url, record.long_url);
            state.status_banner = None;
        }
        UiEvent::Deleted(short_key) => {
            state.status = format!("Deleted {short_key}");
            state.status_banner = None;
            if matches!(&state.last_resolved, Some((key, _)) if *key == short_key) {
                state.last_resolved = None;
            }
        }
        UiEvent::Resolved {
            short_key,
            long_url,
        } => {
            state.status = format!("{short_key} resolves to {long_url}");
            state.last_resolved = Some((short_key, long_url));
        }
        UiEvent::Error(err) => {
            state.status = format!(
                "{} failed ({}): {}",
                err.context().label(),
                err_label(err.category()),
                err.message()
            );
            if err.surfaces_banner() {
                state.status_banner = Some(StatusBanner {
                    severity: StatusBannerSeverity::Error,
                    message: err.user_message(),
                });
            }
        }
    }
}
