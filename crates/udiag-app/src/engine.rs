//! Engine - shared orchestration state for session frontends
//!
//! The Engine owns everything a frontend needs to drive a diagnostic
//! session: the session state, the message channel, the executor client,
//! in-flight request tasks, the shutdown signal, and settings. Frontends
//! feed messages in and observe changes through broadcast events.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};

use udiag_core::prelude::*;

use crate::actions::{handle_action, RequestTaskMap};
use crate::config::Settings;
use crate::engine_event::EngineEvent;
use crate::handler;
use crate::message::Message;
use crate::session::Session;
use crate::signals;
use udiag_api::DiagnosticsClient;

/// Lightweight snapshot of session state for change detection.
///
/// Captured before message processing, compared after to detect
/// what changed and emit appropriate EngineEvents.
#[derive(Debug, Clone)]
struct SessionSnapshot {
    stage: udiag_core::Stage,
    device_id: Option<String>,
    report_id: Option<String>,
    last_error: Option<String>,
}

impl SessionSnapshot {
    fn capture(session: &Session) -> Self {
        Self {
            stage: session.stage,
            device_id: session.device.as_ref().map(|d| d.id.clone()),
            report_id: session.last_response.as_ref().map(|r| r.report_id.clone()),
            last_error: session.last_error.clone(),
        }
    }
}

/// Orchestration engine for a diagnostic session.
///
/// Encapsulates all shared state between frontends:
/// - Session state (the model)
/// - Message channel
/// - Executor client and request task tracking
/// - Shutdown signaling
/// - Settings
/// - Event broadcasting for external consumers
pub struct Engine {
    /// Session state (the model)
    pub session: Session,

    /// Sender half of the unified message channel.
    /// Clone this to give to input sources (signal handler, stdin reader).
    pub msg_tx: mpsc::Sender<Message>,

    /// Receiver half of the unified message channel.
    /// The frontend event loop drains messages from here.
    pub msg_rx: mpsc::Receiver<Message>,

    /// Map of attempt ids to their in-flight request task handles.
    pub request_tasks: RequestTaskMap,

    /// Sender for the shutdown signal. Send `true` to initiate shutdown.
    pub shutdown_tx: watch::Sender<bool>,

    /// Receiver for the shutdown signal. Clone for background tasks.
    pub shutdown_rx: watch::Receiver<bool>,

    /// Loaded settings (cached from config)
    pub settings: Settings,

    /// Shared HTTP client for the diagnostic executor
    client: Arc<DiagnosticsClient>,

    /// Event broadcaster for external consumers.
    /// Subscribers receive EngineEvents after each message processing cycle.
    event_tx: broadcast::Sender<EngineEvent>,
}

impl Engine {
    /// Create a new Engine from loaded settings.
    ///
    /// Performs all shared initialization:
    /// - Builds the executor client from settings
    /// - Creates message channel (capacity 256)
    /// - Creates shutdown signal channel
    /// - Creates request task map
    /// - Spawns signal handler
    /// - Creates event broadcast channel
    pub fn new(settings: Settings) -> Result<Self> {
        // 1. Build the executor client
        let client = Arc::new(DiagnosticsClient::new(
            &settings.backend.url,
            Duration::from_secs(settings.backend.timeout_secs),
        )?);

        // 2. Create message channel
        let (msg_tx, msg_rx) = mpsc::channel::<Message>(256);

        // 3. Create shutdown channel
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        // 4. Create request task map
        let request_tasks: RequestTaskMap = Arc::new(Mutex::new(HashMap::new()));

        // 5. Spawn signal handler
        signals::spawn_signal_handler(msg_tx.clone());

        // 6. Create broadcast channel for engine events (capacity 256)
        let (event_tx, _) = broadcast::channel(256);

        Ok(Self {
            session: Session::new(),
            msg_tx,
            msg_rx,
            request_tasks,
            shutdown_tx,
            shutdown_rx,
            settings,
            client,
            event_tx,
        })
    }

    /// Subscribe to engine events.
    ///
    /// Returns a receiver that gets EngineEvents after each message
    /// processing cycle. Multiple subscribers are supported.
    ///
    /// If the subscriber falls behind (buffer full), older events are
    /// dropped. Use `broadcast::error::RecvError::Lagged` to detect this.
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Process a single message through the update cycle.
    ///
    /// Runs handler::update() and dispatches any resulting action by
    /// spawning an executor request. Emits EngineEvents based on state
    /// changes detected by comparing before/after snapshots.
    pub fn process_message(&mut self, msg: Message) {
        debug!("Processing message: {}", msg.name());

        // Snapshot state before processing
        let pre = SessionSnapshot::capture(&self.session);

        let result = handler::update(&mut self.session, msg);
        if let Some(action) = result.action {
            handle_action(
                action,
                self.client.clone(),
                self.msg_tx.clone(),
                self.request_tasks.clone(),
            );
        }

        // Snapshot state after processing
        let post = SessionSnapshot::capture(&self.session);

        // Emit events for any state changes
        self.emit_events(&pre, &post);
    }

    /// Drain and process all pending messages from the channel.
    ///
    /// Returns the number of messages processed. Events are emitted after
    /// each message is processed.
    pub fn drain_pending_messages(&mut self) -> usize {
        let mut count = 0;
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
            count += 1;
        }
        count
    }

    /// Get a clone of the message sender for spawning input sources.
    pub fn msg_sender(&self) -> mpsc::Sender<Message> {
        self.msg_tx.clone()
    }

    /// Get a clone of the shutdown receiver for background tasks.
    pub fn shutdown_receiver(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    /// Get the shared executor client (for liveness probes).
    pub fn client(&self) -> Arc<DiagnosticsClient> {
        self.client.clone()
    }

    /// Check if the application should quit.
    pub fn should_quit(&self) -> bool {
        self.session.quit_requested
    }

    /// Initiate shutdown: signal background tasks, drain request tasks.
    pub async fn shutdown(&mut self) {
        // Emit shutdown event
        self.emit(EngineEvent::Shutdown);

        // Signal all background tasks to stop
        let _ = self.shutdown_tx.send(true);

        // Drain remaining request tasks with timeout. Collect under the
        // lock, await outside it.
        let tasks: Vec<_> = {
            let mut map = self.request_tasks.lock().unwrap();
            map.drain().collect()
        };

        for (attempt, handle) in tasks {
            match tokio::time::timeout(Duration::from_secs(2), handle).await {
                Ok(Ok(())) => debug!("Request {} cleaned up", attempt),
                Ok(Err(e)) => warn!("Request task {} panicked: {}", attempt, e),
                Err(_) => warn!("Request {} cleanup timed out", attempt),
            }
        }
    }

    /// Emit EngineEvents based on session changes after processing.
    ///
    /// Compares pre/post snapshots to detect what changed.
    fn emit_events(&self, pre: &SessionSnapshot, post: &SessionSnapshot) {
        // Stage transitions
        if pre.stage != post.stage {
            self.emit(EngineEvent::StageChanged {
                from: pre.stage,
                to: post.stage,
            });
        }

        // A device (with catalog) was installed or replaced
        if pre.device_id != post.device_id && post.device_id.is_some() {
            if let Some(device) = &self.session.device {
                self.emit(EngineEvent::DeviceDetected {
                    device: device.clone(),
                    test_count: self.session.available_tests.len(),
                });
            }
        }

        // A new diagnostic report landed
        if pre.report_id != post.report_id && post.report_id.is_some() {
            if let Some(response) = &self.session.last_response {
                if !response.summary.is_consistent(&response.results) {
                    warn!(
                        "Executor summary for {} does not match result counts",
                        response.report_id
                    );
                }
                self.emit(EngineEvent::DiagnosticsCompleted {
                    report_id: response.report_id.clone(),
                    health_score: response.summary.health_score,
                    overall_status: response.summary.overall_status.clone(),
                });
            }
        }

        // A failure message appeared or changed
        if post.last_error.is_some() && pre.last_error != post.last_error {
            if let Some(error) = &post.last_error {
                self.emit(EngineEvent::SessionFailed {
                    error: error.clone(),
                });
            }
        }
    }

    /// Emit a single EngineEvent to all subscribers.
    ///
    /// send() returns Err only if there are no receivers -- that's fine,
    /// we don't want to panic or log errors for having no subscribers.
    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
