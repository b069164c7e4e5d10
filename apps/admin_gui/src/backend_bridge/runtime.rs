//! Runtime bridge between UI command queue and backend event intake.
//!
//! The worker thread owns a multi-thread tokio runtime and a single
//! [`AdminController`]. Each queued command becomes its own task, so a slow
//! request never holds up the next one.

use std::{sync::Arc, thread};

use client_core::{
    Action, ActionOutcome, AdminController, ControllerEvent, Intent, ShortenerClient, UrlApi,
};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, error, info, warn};
use url::Url;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(base_url: Url, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || run_backend(base_url, cmd_rx, ui_tx));
}

fn run_backend(base_url: Url, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    let _ = ui_tx.try_send(UiEvent::Info("Backend worker starting...".to_string()));
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                UiErrorContext::BackendStartup,
                format!("backend worker startup failure: failed to build runtime: {err}"),
            )));
            error!("failed to build backend runtime: {err}");
            return;
        }
    };

    runtime.block_on(async move {
        info!(%base_url, "backend worker using shortener endpoint");
        let controller = AdminController::new(ShortenerClient::new(base_url));
        tokio::spawn(forward_controller_events(
            Arc::clone(&controller),
            controller.subscribe(),
            ui_tx.clone(),
        ));

        let _ = ui_tx.try_send(UiEvent::Info("Backend worker ready".to_string()));

        let activator = Arc::clone(&controller);
        tokio::spawn(async move {
            let _ = activator.activate().await;
        });

        while let Ok(cmd) = cmd_rx.recv() {
            debug!(command = cmd.name(), "backend received ui command");
            let controller = Arc::clone(&controller);
            let ui_tx = ui_tx.clone();
            tokio::spawn(async move {
                let outcome = execute(&controller, cmd).await;
                if let Some(event) = outcome_event(outcome) {
                    send_ui_event(&ui_tx, event);
                }
            });
        }
        info!("ui command queue closed; backend worker exiting");
    });
}

async fn forward_controller_events<A: UrlApi + 'static>(
    controller: Arc<AdminController<A>>,
    mut events: broadcast::Receiver<ControllerEvent>,
    ui_tx: Sender<UiEvent>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(ui_event) = controller_event_to_ui(event) {
                    if !send_ui_event(&ui_tx, ui_event) {
                        break;
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "ui forwarder lagged behind controller events; resyncing");
                let snapshot = controller.snapshot().await;
                if !send_ui_event(&ui_tx, UiEvent::StateChanged(snapshot)) {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Returns `false` once the UI side is gone.
fn send_ui_event(ui_tx: &Sender<UiEvent>, event: UiEvent) -> bool {
    match ui_tx.try_send(event) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("ui event queue is full; dropping backend event");
            true
        }
        Err(TrySendError::Disconnected(_)) => false,
    }
}

pub async fn execute<A: UrlApi + 'static>(
    controller: &AdminController<A>,
    cmd: BackendCommand,
) -> ActionOutcome {
    match cmd {
        BackendCommand::Refresh => controller.run(Intent::Refresh).await,
        BackendCommand::SubmitCreate {
            long_url,
            custom_key,
        } => match controller.submit_create_with(long_url, custom_key).await {
            Ok(record) => ActionOutcome::Created(record),
            Err(error) => ActionOutcome::Failed {
                action: Action::Create,
                error,
            },
        },
        BackendCommand::SubmitDelete { short_key } => {
            controller.run(Intent::SubmitDelete(short_key)).await
        }
        BackendCommand::Resolve { short_key } => controller.run(Intent::Resolve(short_key)).await,
    }
}

/// Failures are reported by the controller's own event stream, so only
/// successes are translated here.
pub fn outcome_event(outcome: ActionOutcome) -> Option<UiEvent> {
    match outcome {
        ActionOutcome::Refreshed { count } => Some(UiEvent::Info(format!(
            "Loaded {count} short URL{}",
            if count == 1 { "" } else { "s" }
        ))),
        ActionOutcome::Created(record) => Some(UiEvent::Created(record)),
        ActionOutcome::Deleted(short_key) => Some(UiEvent::Deleted(short_key)),
        ActionOutcome::Resolved {
            short_key,
            long_url,
        } => Some(UiEvent::Resolved {
            short_key,
            long_url,
        }),
        ActionOutcome::Failed { action, error } => {
            debug!(action = action.as_str(), %error, "action failed; already surfaced");
            None
        }
    }
}

pub fn controller_event_to_ui(event: ControllerEvent) -> Option<UiEvent> {
    match event {
        ControllerEvent::StateChanged(state) => Some(UiEvent::StateChanged(state)),
        ControllerEvent::InputsCleared => Some(UiEvent::InputsCleared),
        ControllerEvent::ActionSucceeded(Action::Refresh) => Some(UiEvent::ListSynced),
        ControllerEvent::ActionSucceeded(_) => None,
        ControllerEvent::ActionFailed { action, error } => Some(UiEvent::Error(
            UiError::from_client_error(action.into(), &error),
        )),
    }
}
