//! Structured session output - NDJSON events on stdout
//!
//! The udiag binary reports session progress as NDJSON (newline-delimited
//! JSON), one event per line, so scripts and test harnesses can parse the
//! workflow reliably. Human-facing hints go to stderr and logs go to the
//! log file; stdout carries nothing but events.
//!
//! # Example Output
//!
//! ```json
//! {"event":"started","executor":"http://127.0.0.1:8000","timestamp":1724580000000}
//! {"event":"device_detected","device_id":"dev-7f3a","name":"Framework 13","os":"Windows 11","icon":"laptop","test_count":6,"timestamp":1724580001000}
//! {"event":"summary","report_id":"report_dev-7f3a_1724580010","total_tests":6,"passed":5,"warnings":1,"failed":0,"errors":0,"health_score":91.7,"overall_status":"healthy","timestamp":1724580011000}
//! ```

use std::io::{self, Write};

use chrono::Utc;
use serde::Serialize;
use tracing::error;

use udiag_api::{AvailableTest, Device, HealthStatus, Summary, TestResult};
use udiag_core::{display_label, group_icon_key, Stage};

/// Events emitted on stdout during a session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// The session controller is up and pointed at an executor
    Started { executor: String, timestamp: i64 },

    /// Outcome of the startup liveness probe
    ExecutorHealth {
        status: String,
        connected_devices: u32,
        timestamp: i64,
    },

    /// The session moved to a different workflow stage
    StageChanged {
        from: String,
        to: String,
        timestamp: i64,
    },

    /// A device was detected and its catalog installed
    DeviceDetected {
        device_id: String,
        name: String,
        os: String,
        icon: String,
        test_count: usize,
        timestamp: i64,
    },

    /// One selectable entry of the detected device's catalog
    TestAvailable {
        test_id: String,
        name: String,
        category: String,
        group: String,
        icon: String,
        duration: String,
        timestamp: i64,
    },

    /// One result of a completed run, in display order
    TestResult {
        test_id: String,
        category: String,
        group: String,
        icon: String,
        status: String,
        severity: Option<u8>,
        confidence: f64,
        explanation: String,
        advisories: Vec<String>,
        metrics: serde_json::Value,
        timestamp: i64,
    },

    /// Executor-computed aggregates for a completed run
    Summary {
        report_id: String,
        total_tests: u32,
        passed: u32,
        warnings: u32,
        failed: u32,
        errors: u32,
        health_score: f64,
        overall_status: String,
        timestamp: i64,
    },

    /// A detection or run failed; `message` is ready for display
    SessionError { message: String, timestamp: i64 },
}

impl SessionEvent {
    /// Emit this event to stdout as one NDJSON line
    pub fn emit(&self) {
        let json = match serde_json::to_string(self) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize session event: {}", e);
                return;
            }
        };

        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", json) {
            error!("Failed to write session event to stdout: {}", e);
            return;
        }

        // Flush to ensure immediate output
        if let Err(e) = stdout.flush() {
            error!("Failed to flush stdout: {}", e);
        }
    }

    /// Get current timestamp in milliseconds
    fn now() -> i64 {
        Utc::now().timestamp_millis()
    }

    // ─────────────────────────────────────────────────────────
    // Convenience constructors
    // ─────────────────────────────────────────────────────────

    pub fn started(executor: &str) -> Self {
        Self::Started {
            executor: executor.to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn executor_health(health: &HealthStatus) -> Self {
        Self::ExecutorHealth {
            status: health.status.clone(),
            connected_devices: health.connected_devices,
            timestamp: Self::now(),
        }
    }

    pub fn stage_changed(from: Stage, to: Stage) -> Self {
        Self::StageChanged {
            from: from.label().to_string(),
            to: to.label().to_string(),
            timestamp: Self::now(),
        }
    }

    pub fn device_detected(device: &Device, test_count: usize) -> Self {
        Self::DeviceDetected {
            device_id: device.id.clone(),
            name: device.display_name(),
            os: device.os_label(),
            icon: device.icon_key().to_string(),
            test_count,
            timestamp: Self::now(),
        }
    }

    pub fn test_available(test: &AvailableTest) -> Self {
        let category = test.category();
        Self::TestAvailable {
            test_id: test.id.clone(),
            name: test.name.clone(),
            category: category.to_string(),
            group: display_label(category).to_string(),
            icon: group_icon_key(category).to_string(),
            duration: test.duration.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn test_result(result: &TestResult) -> Self {
        Self::TestResult {
            test_id: result.test_id.clone(),
            category: result.category.clone(),
            group: display_label(&result.category).to_string(),
            icon: result.icon_key().to_string(),
            status: result.status.clone(),
            severity: result.severity(),
            confidence: result.confidence,
            explanation: result.explanation.clone(),
            advisories: result.advisories.clone(),
            metrics: result.metrics.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn summary(summary: &Summary, report_id: &str) -> Self {
        Self::Summary {
            report_id: report_id.to_string(),
            total_tests: summary.total_tests,
            passed: summary.passed,
            warnings: summary.warnings,
            failed: summary.failed,
            errors: summary.errors,
            health_score: summary.health_score,
            overall_status: summary.overall_status.clone(),
            timestamp: Self::now(),
        }
    }

    pub fn session_error(message: &str) -> Self {
        Self::SessionError {
            message: message.to_string(),
            timestamp: Self::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_device() -> Device {
        Device {
            id: "dev-7f3a".to_string(),
            device_class: "laptop".to_string(),
            make: Some("Framework".to_string()),
            model: Some("13".to_string()),
            os: "Windows".to_string(),
            os_version: "11".to_string(),
            capabilities: Vec::new(),
            connected_at: "2025-08-25T10:12:00".to_string(),
        }
    }

    #[test]
    fn test_started_serialization() {
        let event = SessionEvent::started("http://127.0.0.1:8000");
        let json = serde_json::to_string(&event).expect("serialization failed");

        // Parse back to ensure valid JSON
        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "started");
        assert_eq!(value["executor"], "http://127.0.0.1:8000");
        assert!(value["timestamp"].is_number());
    }

    #[test]
    fn test_stage_changed_serialization() {
        let event = SessionEvent::stage_changed(Stage::Detecting, Stage::Selecting);
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "stage_changed");
        assert_eq!(value["from"], "detecting");
        assert_eq!(value["to"], "selecting");
    }

    #[test]
    fn test_device_detected_serialization() {
        let event = SessionEvent::device_detected(&sample_device(), 6);
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "device_detected");
        assert_eq!(value["device_id"], "dev-7f3a");
        assert_eq!(value["name"], "Framework 13");
        assert_eq!(value["os"], "Windows 11");
        assert_eq!(value["icon"], "laptop");
        assert_eq!(value["test_count"], 6);
    }

    #[test]
    fn test_test_available_serialization() {
        let test = AvailableTest {
            id: "battery.health".to_string(),
            name: "Battery Health Check".to_string(),
            duration: "30s".to_string(),
        };
        let event = SessionEvent::test_available(&test);
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "test_available");
        assert_eq!(value["test_id"], "battery.health");
        assert_eq!(value["category"], "battery");
        assert_eq!(value["group"], "Battery");
        assert_eq!(value["icon"], "battery-charging");
        assert_eq!(value["duration"], "30s");
    }

    #[test]
    fn test_test_result_serialization() {
        let result = TestResult {
            test_id: "battery.health".to_string(),
            category: "power".to_string(),
            status: "warn".to_string(),
            metrics: serde_json::json!({"capacity_pct": 78.5}),
            explanation: "Battery capacity degraded".to_string(),
            confidence: 0.92,
            advisories: vec!["Consider battery replacement".to_string()],
            timestamp: "2025-08-25T10:15:00".to_string(),
        };
        let event = SessionEvent::test_result(&result);
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "test_result");
        assert_eq!(value["category"], "power");
        assert_eq!(value["group"], "Power");
        assert_eq!(value["icon"], "zap");
        assert_eq!(value["status"], "warn");
        assert_eq!(value["severity"], 1);
        assert_eq!(value["metrics"]["capacity_pct"], 78.5);
        assert_eq!(value["advisories"][0], "Consider battery replacement");
    }

    #[test]
    fn test_pending_result_has_null_severity() {
        let result = TestResult {
            test_id: "display.pixels".to_string(),
            category: "display".to_string(),
            status: "needs-user".to_string(),
            metrics: serde_json::Value::Null,
            explanation: String::new(),
            confidence: 0.0,
            advisories: Vec::new(),
            timestamp: String::new(),
        };
        let event = SessionEvent::test_result(&result);
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();

        // The raw status rides through untouched; severity is null.
        assert_eq!(value["status"], "needs-user");
        assert!(value["severity"].is_null());
    }

    #[test]
    fn test_summary_serialization() {
        let summary = Summary {
            total_tests: 6,
            passed: 5,
            warnings: 1,
            failed: 0,
            errors: 0,
            health_score: 91.7,
            overall_status: "healthy".to_string(),
        };
        let event = SessionEvent::summary(&summary, "report_dev-7f3a_1724580010");
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "summary");
        assert_eq!(value["report_id"], "report_dev-7f3a_1724580010");
        assert_eq!(value["total_tests"], 6);
        assert_eq!(value["health_score"], 91.7);
        assert_eq!(value["overall_status"], "healthy");
    }

    #[test]
    fn test_session_error_serialization() {
        let event = SessionEvent::session_error("executor unreachable");
        let json = serde_json::to_string(&event).expect("serialization failed");

        let value: serde_json::Value = serde_json::from_str(&json).expect("invalid JSON");

        assert_eq!(value["event"], "session_error");
        assert_eq!(value["message"], "executor unreachable");
        assert!(value["timestamp"].is_number());
    }
}
