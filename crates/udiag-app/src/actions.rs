//! Action handling for the session engine
//!
//! Actions returned by the update function are dispatched here. Each action
//! spawns a tokio task that talks to the executor and reports back by
//! sending a completion message through the engine's message channel. The
//! update function never blocks on the network.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use udiag_api::{DiagnosticRequest, DiagnosticsClient};

use crate::handler::UpdateAction;
use crate::message::Message;

/// Tracks in-flight executor request tasks, keyed by attempt id
pub type RequestTaskMap = Arc<Mutex<HashMap<u64, JoinHandle<()>>>>;

/// Dispatch an action produced by the update function
///
/// This is synchronous. Long-running work is spawned onto the runtime and
/// its outcome comes back as a message, so a stale reply can be recognized
/// by its attempt id and discarded.
pub fn handle_action(
    action: UpdateAction,
    client: Arc<DiagnosticsClient>,
    msg_tx: mpsc::Sender<Message>,
    tasks: RequestTaskMap,
) {
    match action {
        UpdateAction::StartDetect { attempt } => {
            spawn_detect(attempt, client, msg_tx, tasks);
        }
        UpdateAction::StartRun {
            attempt,
            device_id,
            tests,
        } => {
            spawn_run(attempt, device_id, tests, client, msg_tx, tasks);
        }
    }
}

// ─────────────────────────────────────────────────────────
// Spawn helpers
// ─────────────────────────────────────────────────────────

/// Detect the connected device and fetch its test catalog
///
/// Both calls run inside one task so the session sees a single atomic
/// outcome: either a device plus its catalog, or a failure.
fn spawn_detect(
    attempt: u64,
    client: Arc<DiagnosticsClient>,
    msg_tx: mpsc::Sender<Message>,
    tasks: RequestTaskMap,
) {
    debug!(attempt, "spawning device detection");

    let handle = tokio::spawn(async move {
        let outcome = async {
            let device = client.detect_device().await?;
            let capabilities = client.list_capabilities(&device.id).await?;
            Ok::<_, udiag_core::Error>((device, capabilities.available_tests))
        }
        .await;

        match outcome {
            Ok((device, tests)) => {
                let _ = msg_tx
                    .send(Message::DetectCompleted {
                        attempt,
                        device,
                        tests,
                    })
                    .await;
            }
            Err(e) => {
                let _ = msg_tx
                    .send(Message::DetectFailed {
                        attempt,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    });

    track_task(&tasks, attempt, handle);
}

/// Submit the selected tests to the executor
fn spawn_run(
    attempt: u64,
    device_id: String,
    tests: Vec<String>,
    client: Arc<DiagnosticsClient>,
    msg_tx: mpsc::Sender<Message>,
    tasks: RequestTaskMap,
) {
    debug!(attempt, test_count = tests.len(), "spawning diagnostic run");

    let handle = tokio::spawn(async move {
        let request = DiagnosticRequest::new(device_id, tests);
        match client.run_diagnostics(&request).await {
            Ok(response) => {
                let _ = msg_tx
                    .send(Message::RunCompleted {
                        attempt,
                        response: Box::new(response),
                    })
                    .await;
            }
            Err(e) => {
                let _ = msg_tx
                    .send(Message::RunFailed {
                        attempt,
                        error: e.to_string(),
                    })
                    .await;
            }
        }
    });

    track_task(&tasks, attempt, handle);
}

/// Record a spawned task, dropping handles of tasks that already finished
fn track_task(tasks: &RequestTaskMap, attempt: u64, handle: JoinHandle<()>) {
    let mut map = tasks.lock().unwrap();
    map.retain(|_, h| !h.is_finished());
    map.insert(attempt, handle);
}

// ─────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────
