//! Events broadcast by the session engine
//!
//! Frontends subscribe to these instead of polling session state. Events are
//! derived by diffing the session before and after each processed message,
//! so every subscriber sees the same sequence regardless of which message
//! caused the change.

use udiag_api::Device;
use udiag_core::Stage;

/// A state change worth surfacing outside the engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    // ─────────────────────────────────────────────────────────
    // Workflow progress
    // ─────────────────────────────────────────────────────────
    /// The session moved to a different workflow stage
    StageChanged { from: Stage, to: Stage },

    /// Detection finished and a device (with its catalog) is installed
    DeviceDetected { device: Device, test_count: usize },

    /// A diagnostic run finished and results are available
    DiagnosticsCompleted {
        report_id: String,
        health_score: f64,
        overall_status: String,
    },

    // ─────────────────────────────────────────────────────────
    // Failures and lifecycle
    // ─────────────────────────────────────────────────────────
    /// An executor request failed; `error` is ready to show to the user
    SessionFailed { error: String },

    /// The engine is shutting down
    Shutdown,
}

impl EngineEvent {
    /// Stable label for logging and line-oriented output
    pub fn event_type(&self) -> &'static str {
        match self {
            EngineEvent::StageChanged { .. } => "stage_changed",
            EngineEvent::DeviceDetected { .. } => "device_detected",
            EngineEvent::DiagnosticsCompleted { .. } => "diagnostics_completed",
            EngineEvent::SessionFailed { .. } => "session_failed",
            EngineEvent::Shutdown => "shutdown",
        }
    }
}
