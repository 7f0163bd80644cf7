//! Handler module - update function and the actions it can request
//!
//! `update` is the only place session state changes. It never performs IO
//! itself: network work is described by an [`UpdateAction`] and dispatched by
//! the engine, which later feeds the outcome back in as a completion message.

pub(crate) mod update;


// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone)]
pub enum UpdateAction {
    /// Start the detection sequence: detect the device, then fetch its
    /// test catalog. One background task performs both calls so the
    /// completion is atomic.
    StartDetect { attempt: u64 },

    /// Submit a diagnostic run for the selected tests
    StartRun {
        attempt: u64,
        device_id: String,
        /// Selected ids in stable order
        tests: Vec<String>,
    },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            action: Some(action),
        }
    }
}
