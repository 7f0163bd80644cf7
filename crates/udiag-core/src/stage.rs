//! Guided workflow stages for a diagnostic session

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of the guided diagnostic workflow
///
/// A session moves forward through these stages in order. The only
/// sanctioned back-edges start from [`Stage::Results`]: re-selection
/// ("run new tests" -> Selecting) and a full reset ("scan new device"
/// -> Detecting). All other jumps are rejected by the session handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Waiting for a device to be detected
    #[default]
    Detecting,
    /// Device known, user is picking tests from the catalog
    Selecting,
    /// Diagnostic run submitted to the executor
    Running,
    /// Results received and available for rendering
    Results,
}

impl Stage {
    /// Short lowercase label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Detecting => "detecting",
            Stage::Selecting => "selecting",
            Stage::Running => "running",
            Stage::Results => "results",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
