//! Session store: the single mutable record of one guided diagnostic session
//!
//! The session is an explicit value owned by the engine and mutated only by
//! `handler::update`. Everything else (event emission, rendering) reads it.

use std::collections::BTreeSet;

use udiag_api::{AvailableTest, Device, DiagnosticResponse};
use udiag_core::Stage;

/// All state accumulated across one diagnostic session
///
/// Created at process start in stage Detecting. Data for later stages fills
/// in as transitions succeed and is cleared again by the two back-edges from
/// Results. Nothing is persisted across restarts.
#[derive(Debug, Default)]
pub struct Session {
    /// Current workflow stage
    pub stage: Stage,

    /// Detected device, present from the end of a successful detect
    pub device: Option<Device>,

    /// Test catalog for the detected device, in the order the executor sent
    /// it. Set atomically with `device`: both present or both absent.
    pub available_tests: Vec<AvailableTest>,

    /// Test ids ticked for the next run. Ordered so request payloads are
    /// deterministic.
    pub selected: BTreeSet<String>,

    /// Payload of the most recent completed run
    pub last_response: Option<DiagnosticResponse>,

    /// Most recent failure message, cleared when a new detect or run starts
    pub last_error: Option<String>,

    /// Set once the user asked to quit
    pub quit_requested: bool,

    /// True while a detect or run request is outstanding
    busy: bool,

    /// Monotonic id of the newest network attempt
    attempt: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a network request is currently outstanding
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Mark the start of a new network attempt and return its id.
    ///
    /// Completion messages carry the id back; anything but the newest id
    /// is stale and gets discarded by `finish_attempt`.
    pub fn begin_attempt(&mut self) -> u64 {
        self.attempt += 1;
        self.busy = true;
        self.attempt
    }

    /// Mark an attempt finished.
    ///
    /// Returns false when `attempt` is stale or already finished, in which
    /// case the caller must discard the completion without touching state.
    /// The busy flag only clears for the newest attempt.
    pub fn finish_attempt(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || !self.busy {
            return false;
        }
        self.busy = false;
        true
    }

    /// Symmetric-difference toggle of one test id
    pub fn toggle_test(&mut self, test_id: &str) {
        if !self.selected.remove(test_id) {
            self.selected.insert(test_id.to_string());
        }
    }

    /// Select every test in the catalog
    pub fn select_all(&mut self) {
        self.selected = self
            .available_tests
            .iter()
            .map(|t| t.id.clone())
            .collect();
    }

    /// Selected ids in stable (lexicographic) order
    pub fn selected_tests(&self) -> Vec<String> {
        self.selected.iter().cloned().collect()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Install a successful detection: device and catalog land together.
    pub fn install_detection(&mut self, device: Device, tests: Vec<AvailableTest>) {
        self.device = Some(device);
        self.available_tests = tests;
        self.stage = Stage::Selecting;
    }

    /// Drop any partial detection state after a failed detect.
    pub fn clear_detection(&mut self) {
        self.device = None;
        self.available_tests.clear();
    }

    /// Back-edge "run new tests": keep device and catalog, drop selection
    /// and results, return to Selecting.
    pub fn reset_for_new_run(&mut self) {
        self.selected.clear();
        self.last_response = None;
        self.stage = Stage::Selecting;
    }

    /// Back-edge "scan new device": drop everything and return to Detecting.
    pub fn reset_for_new_device(&mut self) {
        self.device = None;
        self.available_tests.clear();
        self.selected.clear();
        self.last_response = None;
        self.last_error = None;
        self.stage = Stage::Detecting;
    }
}
