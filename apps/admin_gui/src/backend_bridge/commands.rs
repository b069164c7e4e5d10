//! Backend commands queued from UI to backend worker.

use shared::domain::ShortKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    Refresh,
    SubmitCreate {
        long_url: String,
        custom_key: String,
    },
    SubmitDelete {
        short_key: ShortKey,
    },
    Resolve {
        short_key: ShortKey,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::Refresh => "refresh",
            BackendCommand::SubmitCreate { .. } => "submit_create",
            BackendCommand::SubmitDelete { .. } => "submit_delete",
            BackendCommand::Resolve { .. } => "resolve",
        }
    }
}
