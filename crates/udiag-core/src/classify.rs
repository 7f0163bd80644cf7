//! Result classification: presentation facts derived from raw executor strings
//!
//! Everything in this module is a pure, total function. Status and category
//! strings arrive from the executor unvalidated, so every lookup tolerates
//! arbitrary input and falls back to a defined default instead of failing.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical outcome of a single diagnostic test
///
/// Parsed from the executor's raw status string. Anything outside the four
/// known statuses maps to [`TestStatus::Pending`], which renders distinctly
/// and carries no severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    Pass,
    Warn,
    Fail,
    Error,
    /// Unrecognized or not-yet-reported status
    Pending,
}

impl TestStatus {
    /// Parse an executor status string. Total: unknown strings become Pending.
    pub fn from_raw(raw: &str) -> Self {
        match raw {
            "pass" => TestStatus::Pass,
            "warn" => TestStatus::Warn,
            "fail" => TestStatus::Fail,
            "error" => TestStatus::Error,
            _ => TestStatus::Pending,
        }
    }

    /// Sort/emphasis weight: pass is lowest, fail and error share the top.
    ///
    /// Pending has no severity at all and is rendered as its own thing,
    /// so it returns None rather than a rank.
    pub fn severity(&self) -> Option<u8> {
        match self {
            TestStatus::Pass => Some(0),
            TestStatus::Warn => Some(1),
            TestStatus::Fail => Some(2),
            TestStatus::Error => Some(2),
            TestStatus::Pending => None,
        }
    }

    /// Lowercase label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            TestStatus::Pass => "pass",
            TestStatus::Warn => "warn",
            TestStatus::Fail => "fail",
            TestStatus::Error => "error",
            TestStatus::Pending => "pending",
        }
    }

    /// Whether this status counts against device health
    pub fn is_problem(&self) -> bool {
        matches!(self, TestStatus::Fail | TestStatus::Error)
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Grouping key for a test id: everything before the first `.` separator.
///
/// Ids without a separator are their own category. Purely a display key,
/// so any string is accepted.
pub fn category_of(test_id: &str) -> &str {
    match test_id.find('.') {
        Some(idx) => &test_id[..idx],
        None => test_id,
    }
}

/// Icon key for a test category, with a generic fallback.
///
/// Keys follow the icon set used by the results renderer.
pub fn group_icon_key(category: &str) -> &'static str {
    match category {
        "battery" => "battery-charging",
        "power" => "zap",
        "storage" => "hard-drive",
        "cpu" => "cpu",
        "performance" => "gauge",
        "memory" => "memory-stick",
        "network" => "wifi",
        "display" => "monitor",
        "sensors" => "radar",
        _ => "activity",
    }
}

/// Human label for a test category. Unknown categories pass through as-is.
pub fn display_label(category: &str) -> &str {
    match category {
        "battery" => "Battery",
        "power" => "Power",
        "storage" => "Storage",
        "cpu" => "CPU",
        "performance" => "Performance",
        "memory" => "Memory",
        "network" => "Network",
        "display" => "Display",
        "sensors" => "Sensors",
        _ => category,
    }
}

/// Icon key for a device class, with a generic fallback.
pub fn device_icon_key(device_class: &str) -> &'static str {
    match device_class {
        "phone" => "smartphone",
        "tablet" => "tablet",
        "laptop" => "laptop",
        "desktop" => "monitor",
        "watch" => "watch",
        _ => "smartphone",
    }
}
