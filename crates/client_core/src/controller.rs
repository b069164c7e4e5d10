//! View state controller: owns the form inputs and the mirrored URL list, and
//! drives the mutate-then-reload cycle against a [`UrlApi`].
//!
//! The backend is the only source of truth. Every successful create or delete
//! is followed by a full `list()` and the local copy is replaced wholesale.
//! Concurrent actions are not sequenced; whichever refresh completes last
//! decides what `urls` holds.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::ShortKey,
    protocol::{CreateUrlRequest, ShortenedUrlRecord},
};
use tokio::{
    sync::{broadcast, RwLock},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{error::ClientError, UrlApi};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPhase {
    Idle,
    Submitting,
    Refreshing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Create,
    Delete,
    Refresh,
    Resolve,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Delete => "delete",
            Action::Refresh => "refresh",
            Action::Resolve => "resolve",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacedError {
    pub action: Action,
    pub error: ClientError,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub input_long_url: String,
    pub input_custom_key: String,
    pub urls: Vec<ShortenedUrlRecord>,
    pub in_flight_mutations: usize,
    pub in_flight_refreshes: usize,
    pub last_error: Option<SurfacedError>,
}

impl ViewState {
    pub fn phase(&self) -> ControllerPhase {
        if self.in_flight_mutations > 0 {
            ControllerPhase::Submitting
        } else if self.in_flight_refreshes > 0 {
            ControllerPhase::Refreshing
        } else {
            ControllerPhase::Idle
        }
    }

    pub fn contains(&self, short_key: &ShortKey) -> bool {
        self.urls.iter().any(|record| &record.short_key == short_key)
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    /// Emitted after every write, carrying the full post-write state.
    StateChanged(ViewState),
    InputsCleared,
    ActionSucceeded(Action),
    ActionFailed { action: Action, error: ClientError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Refresh,
    SubmitCreate,
    SubmitDelete(ShortKey),
    Resolve(ShortKey),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Refreshed { count: usize },
    Created(ShortenedUrlRecord),
    Deleted(ShortKey),
    Resolved { short_key: ShortKey, long_url: String },
    Failed { action: Action, error: ClientError },
}

pub struct AdminController<A: UrlApi> {
    api: A,
    state: RwLock<ViewState>,
    events: broadcast::Sender<ControllerEvent>,
    activated: AtomicBool,
}

impl<A: UrlApi + 'static> AdminController<A> {
    pub fn new(api: A) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            state: RwLock::new(ViewState::default()),
            events,
            activated: AtomicBool::new(false),
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ViewState {
        self.state.read().await.clone()
    }

    pub async fn set_inputs(&self, long_url: impl Into<String>, custom_key: impl Into<String>) {
        let long_url = long_url.into();
        let custom_key = custom_key.into();
        self.update(|state| {
            state.input_long_url = long_url;
            state.input_custom_key = custom_key;
        })
        .await;
    }

    /// Initial load. Only the first call per controller performs a refresh.
    pub async fn activate(&self) -> Option<Result<Vec<ShortenedUrlRecord>, ClientError>> {
        if self.activated.swap(true, Ordering::SeqCst) {
            debug!("controller already activated; skipping initial refresh");
            return None;
        }
        info!("controller activated; loading url list");
        Some(self.refresh().await)
    }

    pub async fn refresh(&self) -> Result<Vec<ShortenedUrlRecord>, ClientError> {
        self.update(|state| state.in_flight_refreshes += 1).await;
        self.finish_refresh().await
    }

    /// Expects `in_flight_refreshes` to have been bumped by the caller.
    async fn finish_refresh(&self) -> Result<Vec<ShortenedUrlRecord>, ClientError> {
        match self.api.list().await {
            Ok(urls) => {
                let replacement = urls.clone();
                self.update(move |state| {
                    state.in_flight_refreshes -= 1;
                    state.urls = replacement;
                    state.last_error = None;
                })
                .await;
                debug!(count = urls.len(), "url list replaced");
                self.emit(ControllerEvent::ActionSucceeded(Action::Refresh));
                Ok(urls)
            }
            Err(err) => {
                self.fail(Action::Refresh, &err, |state| state.in_flight_refreshes -= 1)
                    .await;
                Err(err)
            }
        }
    }

    /// Creates a short URL from the current inputs.
    ///
    /// On success the inputs are cleared and the list is reloaded; a failed
    /// reload is reported through [`ControllerEvent::ActionFailed`] but does
    /// not turn the create itself into an error. On failure the inputs and
    /// `urls` are left as they were.
    pub async fn submit_create(&self) -> Result<ShortenedUrlRecord, ClientError> {
        let request = self
            .update(|state| {
                state.in_flight_mutations += 1;
                CreateUrlRequest::from_inputs(&state.input_long_url, &state.input_custom_key)
            })
            .await;
        self.send_create(request).await
    }

    /// Stores the inputs and builds the request under a single state write, so
    /// overlapping submissions each carry their own payload.
    pub async fn submit_create_with(
        &self,
        long_url: impl Into<String>,
        custom_key: impl Into<String>,
    ) -> Result<ShortenedUrlRecord, ClientError> {
        let long_url = long_url.into();
        let custom_key = custom_key.into();
        let request = self
            .update(move |state| {
                state.in_flight_mutations += 1;
                let request = CreateUrlRequest::from_inputs(&long_url, &custom_key);
                state.input_long_url = long_url;
                state.input_custom_key = custom_key;
                request
            })
            .await;
        self.send_create(request).await
    }

    async fn send_create(
        &self,
        request: CreateUrlRequest,
    ) -> Result<ShortenedUrlRecord, ClientError> {
        match self.api.create(&request).await {
            Ok(record) => {
                self.update(|state| {
                    state.in_flight_mutations -= 1;
                    state.in_flight_refreshes += 1;
                    state.input_long_url.clear();
                    state.input_custom_key.clear();
                    state.last_error = None;
                })
                .await;
                info!(short_key = %record.short_key, long_url = %record.long_url, "short url created");
                self.emit(ControllerEvent::InputsCleared);
                self.emit(ControllerEvent::ActionSucceeded(Action::Create));
                let _ = self.finish_refresh().await;
                Ok(record)
            }
            Err(err) => {
                self.fail(Action::Create, &err, |state| state.in_flight_mutations -= 1)
                    .await;
                Err(err)
            }
        }
    }

    /// Deletes `short_key` and reloads the list. A failed delete triggers no reload.
    pub async fn submit_delete(&self, short_key: &ShortKey) -> Result<(), ClientError> {
        self.update(|state| state.in_flight_mutations += 1).await;

        match self.api.delete(short_key).await {
            Ok(()) => {
                self.update(|state| {
                    state.in_flight_mutations -= 1;
                    state.in_flight_refreshes += 1;
                    state.last_error = None;
                })
                .await;
                info!(%short_key, "short url deleted");
                self.emit(ControllerEvent::ActionSucceeded(Action::Delete));
                let _ = self.finish_refresh().await;
                Ok(())
            }
            Err(err) => {
                self.fail(Action::Delete, &err, |state| state.in_flight_mutations -= 1)
                    .await;
                Err(err)
            }
        }
    }

    /// Looks up the long URL behind `short_key`. Leaves the view state alone.
    pub async fn resolve(&self, short_key: &ShortKey) -> Result<String, ClientError> {
        match self.api.resolve(short_key).await {
            Ok(long_url) => {
                self.emit(ControllerEvent::ActionSucceeded(Action::Resolve));
                Ok(long_url)
            }
            Err(err) => {
                self.surface(Action::Resolve, &err);
                Err(err)
            }
        }
    }

    pub async fn run(&self, intent: Intent) -> ActionOutcome {
        match intent {
            Intent::Refresh => match self.refresh().await {
                Ok(urls) => ActionOutcome::Refreshed { count: urls.len() },
                Err(error) => ActionOutcome::Failed {
                    action: Action::Refresh,
                    error,
                },
            },
            Intent::SubmitCreate => match self.submit_create().await {
                Ok(record) => ActionOutcome::Created(record),
                Err(error) => ActionOutcome::Failed {
                    action: Action::Create,
                    error,
                },
            },
            Intent::SubmitDelete(short_key) => match self.submit_delete(&short_key).await {
                Ok(()) => ActionOutcome::Deleted(short_key),
                Err(error) => ActionOutcome::Failed {
                    action: Action::Delete,
                    error,
                },
            },
            Intent::Resolve(short_key) => match self.resolve(&short_key).await {
                Ok(long_url) => ActionOutcome::Resolved {
                    short_key,
                    long_url,
                },
                Err(error) => ActionOutcome::Failed {
                    action: Action::Resolve,
                    error,
                },
            },
        }
    }

    /// Runs `intent` as an independent task on the current tokio runtime.
    pub fn dispatch(self: &Arc<Self>, intent: Intent) -> JoinHandle<ActionOutcome> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.run(intent).await })
    }

    async fn update<R>(&self, apply: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut state = self.state.write().await;
        let result = apply(&mut state);
        let snapshot = state.clone();
        drop(state);
        debug!(
            phase = ?snapshot.phase(),
            urls = snapshot.urls.len(),
            "view state changed"
        );
        self.emit(ControllerEvent::StateChanged(snapshot));
        result
    }

    async fn fail(&self, action: Action, err: &ClientError, settle: impl FnOnce(&mut ViewState)) {
        let surfaced = SurfacedError {
            action,
            error: err.clone(),
        };
        self.update(move |state| {
            settle(state);
            state.last_error = Some(surfaced);
        })
        .await;
        self.surface(action, err);
    }

    fn surface(&self, action: Action, err: &ClientError) {
        warn!(action = action.as_str(), error = %err, "controller action failed");
        self.emit(ControllerEvent::ActionFailed {
            action,
            error: err.clone(),
        });
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is a normal state (e.g. the CLI).
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
