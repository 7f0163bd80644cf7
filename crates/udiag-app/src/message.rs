//! Message types for session updates
//!
//! User intents arrive from whatever front-end drives the engine; completion
//! messages arrive from the background request tasks and carry the attempt id
//! they belong to, so stale responses can be told apart from current ones.

use udiag_api::{AvailableTest, Device, DiagnosticResponse};

/// All inputs that can change the session
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────
    // User intents
    // ─────────────────────────────────────────────────────────
    /// Start device detection
    DetectRequested,

    /// Toggle one test id in the selection
    ToggleTest { test_id: String },

    /// Select every test in the catalog
    SelectAllTests,

    /// Empty the selection
    ClearSelection,

    /// Submit the selected tests to the executor
    RunRequested,

    /// From results, return to selection with the same device ("run new tests")
    RunNewTests,

    /// From results, drop everything and detect again ("scan new device")
    ScanNewDevice,

    /// Exit the application
    Quit,

    // ─────────────────────────────────────────────────────────
    // Request completions (from background tasks)
    // ─────────────────────────────────────────────────────────
    /// Detection succeeded. Device and catalog arrive together so the
    /// session never holds one without the other.
    DetectCompleted {
        attempt: u64,
        device: Device,
        tests: Vec<AvailableTest>,
    },

    /// Detection failed (either of its two executor calls)
    DetectFailed { attempt: u64, error: String },

    /// Diagnostic run succeeded
    RunCompleted {
        attempt: u64,
        response: Box<DiagnosticResponse>,
    },

    /// Diagnostic run failed
    RunFailed { attempt: u64, error: String },
}

impl Message {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Message::DetectRequested => "DetectRequested",
            Message::ToggleTest { .. } => "ToggleTest",
            Message::SelectAllTests => "SelectAllTests",
            Message::ClearSelection => "ClearSelection",
            Message::RunRequested => "RunRequested",
            Message::RunNewTests => "RunNewTests",
            Message::ScanNewDevice => "ScanNewDevice",
            Message::Quit => "Quit",
            Message::DetectCompleted { .. } => "DetectCompleted",
            Message::DetectFailed { .. } => "DetectFailed",
            Message::RunCompleted { .. } => "RunCompleted",
            Message::RunFailed { .. } => "RunFailed",
        }
    }
}
