//! Wire types for the diagnostic executor protocol
//!
//! Field names match the executor's JSON exactly (snake_case on both sides,
//! so no renames are needed). Timestamps are opaque display strings and are
//! never parsed or compared locally.

use serde::{Deserialize, Serialize};

use udiag_core::classify::{category_of, device_icon_key, group_icon_key, TestStatus};

/// A detected device as reported by the executor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Device {
    /// Unique device identifier
    pub id: String,

    /// Device class ("phone", "desktop", "laptop", ...), used for icon choice only
    pub device_class: String,

    /// Manufacturer, when the agent could determine it
    #[serde(default)]
    pub make: Option<String>,

    /// Model name, when the agent could determine it
    #[serde(default)]
    pub model: Option<String>,

    /// Operating system name
    pub os: String,

    /// Operating system version string
    pub os_version: String,

    /// Capability strings advertised by the device agent
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Connection timestamp, displayed verbatim
    pub connected_at: String,
}

impl Device {
    /// Get a display string for the device
    ///
    /// Prefers make + model, falls back to the raw id when neither is known.
    pub fn display_name(&self) -> String {
        match (&self.make, &self.model) {
            (Some(make), Some(model)) => format!("{} {}", make, model),
            (Some(make), None) => make.clone(),
            (None, Some(model)) => model.clone(),
            (None, None) => self.id.clone(),
        }
    }

    /// OS name and version, e.g. "Windows 11"
    pub fn os_label(&self) -> String {
        format!("{} {}", self.os, self.os_version)
    }

    /// Icon key for this device's class
    pub fn icon_key(&self) -> &'static str {
        device_icon_key(&self.device_class)
    }
}

/// One entry of the test catalog offered for a detected device
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AvailableTest {
    /// Unique test id in `{category}.{name}` form
    pub id: String,

    /// Human label
    pub name: String,

    /// Rough duration hint ("30s", "90s", "manual"), displayed verbatim
    pub duration: String,
}

impl AvailableTest {
    /// Grouping key derived from the id prefix
    pub fn category(&self) -> &str {
        category_of(&self.id)
    }
}

/// Catalog payload for a detected device
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CapabilitiesResponse {
    /// Device the catalog applies to
    pub device_id: String,

    /// Capability strings echoed back by the executor
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// Tests the user can select for this device
    #[serde(default)]
    pub available_tests: Vec<AvailableTest>,
}

/// Outcome of one executed test
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestResult {
    /// Id of the test that produced this result
    pub test_id: String,

    /// Executor-assigned category label. May differ from the id prefix
    /// (e.g. `battery.health` reports under "power"), so display code
    /// uses this field, not `category_of(test_id)`.
    pub category: String,

    /// Raw status string ("pass", "warn", "fail", "error", or anything else)
    pub status: String,

    /// Free-form measurement object, rendered as-is
    #[serde(default)]
    pub metrics: serde_json::Value,

    /// Human explanation of the outcome
    #[serde(default)]
    pub explanation: String,

    /// Executor confidence in the verdict, 0.0 to 1.0
    #[serde(default)]
    pub confidence: f64,

    /// Suggested follow-up actions
    #[serde(default)]
    pub advisories: Vec<String>,

    /// Completion timestamp, displayed verbatim
    #[serde(default)]
    pub timestamp: String,
}

impl TestResult {
    /// Canonical status parsed from the raw string
    pub fn status(&self) -> TestStatus {
        TestStatus::from_raw(&self.status)
    }

    /// Severity rank for emphasis and sorting, None for pending
    pub fn severity(&self) -> Option<u8> {
        self.status().severity()
    }

    /// Icon key for this result's category group
    pub fn icon_key(&self) -> &'static str {
        group_icon_key(&self.category)
    }
}

/// Aggregate counts computed by the executor
///
/// Produced entirely on the executor side. The client consumes and displays
/// these numbers and never recomputes or corrects them, even when they
/// disagree with the accompanying results.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Summary {
    pub total_tests: u32,
    pub passed: u32,
    pub warnings: u32,
    pub failed: u32,
    pub errors: u32,

    /// Health score from 0 to 100
    pub health_score: f64,

    /// Single summarizing label ("healthy" or "issues_detected")
    pub overall_status: String,
}

impl Summary {
    /// Check the aggregate counts against the results they ship with.
    ///
    /// Statuses are recounted through the classifier, so results with an
    /// unrecognized status fall into no bucket and still count toward the
    /// expected total. A false return is worth flagging, never fixing.
    pub fn is_consistent(&self, results: &[TestResult]) -> bool {
        let mut passed = 0u32;
        let mut warnings = 0u32;
        let mut failed = 0u32;
        let mut errors = 0u32;

        for result in results {
            match result.status() {
                TestStatus::Pass => passed += 1,
                TestStatus::Warn => warnings += 1,
                TestStatus::Fail => failed += 1,
                TestStatus::Error => errors += 1,
                TestStatus::Pending => {}
            }
        }

        self.total_tests as usize == results.len()
            && self.passed == passed
            && self.warnings == warnings
            && self.failed == failed
            && self.errors == errors
    }

    /// Whether the executor judged the device healthy
    pub fn is_healthy(&self) -> bool {
        self.overall_status == "healthy"
    }

    /// Number of tests that count against device health
    pub fn problem_count(&self) -> u32 {
        self.failed + self.errors
    }
}

/// Full payload of a completed diagnostic run
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DiagnosticResponse {
    /// Device the run executed against
    pub device: Device,

    /// Per-test results, preserved in executor order
    pub results: Vec<TestResult>,

    /// Aggregates computed by the executor
    pub summary: Summary,

    /// Opaque report identifier, e.g. "report_dev-123_1724580000"
    pub report_id: String,
}

/// Run submission payload
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRequest {
    /// Device to run against
    pub device_id: String,

    /// Selected test ids
    pub tests: Vec<String>,

    /// Executor tuning knobs. Always sent, currently always empty.
    pub options: serde_json::Map<String, serde_json::Value>,
}

impl DiagnosticRequest {
    pub fn new(device_id: impl Into<String>, tests: Vec<String>) -> Self {
        Self {
            device_id: device_id.into(),
            tests,
            options: serde_json::Map::new(),
        }
    }
}

/// Executor liveness payload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthStatus {
    /// Liveness label, "healthy" when the executor is up
    pub status: String,

    /// Server-side timestamp, displayed verbatim
    pub timestamp: String,

    /// Number of devices the executor currently tracks
    #[serde(default)]
    pub connected_devices: u32,
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
            capabilities: vec!["battery".to_string(), "storage".to_string()],
            connected_at: "2025-08-25T10:12:00".to_string(),
        }
    }

    fn sample_result(test_id: &str, category: &str, status: &str) -> TestResult {
        TestResult {
            test_id: test_id.to_string(),
            category: category.to_string(),
            status: status.to_string(),
            metrics: serde_json::json!({}),
            explanation: String::new(),
            confidence: 0.9,
            advisories: Vec::new(),
            timestamp: "2025-08-25T10:15:00".to_string(),
        }
    }

    fn sample_summary(passed: u32, warnings: u32, failed: u32, errors: u32) -> Summary {
        Summary {
            total_tests: passed + warnings + failed + errors,
            passed,
            warnings,
            failed,
            errors,
            health_score: 100.0,
            overall_status: if failed == 0 && errors == 0 {
                "healthy".to_string()
            } else {
                "issues_detected".to_string()
            },
        }
    }

    #[test]
    fn test_parse_device_payload() {
        let json = r#"{
            "id": "dev-7f3a",
            "device_class": "laptop",
            "make": "Framework",
            "model": "13",
            "os": "Windows",
            "os_version": "11",
            "capabilities": ["battery", "storage", "cpu"],
            "connected_at": "2025-08-25T10:12:00.120394"
        }"#;

        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(device.id, "dev-7f3a");
        assert_eq!(device.device_class, "laptop");
        assert_eq!(device.capabilities.len(), 3);
    }

    #[test]
    fn test_parse_device_minimal_payload() {
        // make/model/capabilities may be absent entirely.
        let json = r#"{
            "id": "dev-1",
            "device_class": "phone",
            "os": "Android",
            "os_version": "15",
            "connected_at": "2025-08-25T10:12:00"
        }"#;

        let device: Device = serde_json::from_str(json).unwrap();
        assert!(device.make.is_none());
        assert!(device.model.is_none());
        assert!(device.capabilities.is_empty());
    }

    #[test]
    fn test_device_display_name() {
        let device = sample_device();
        assert_eq!(device.display_name(), "Framework 13");

        let device = Device {
            make: None,
            model: None,
            ..sample_device()
        };
        assert_eq!(device.display_name(), "dev-7f3a");

        let device = Device {
            make: None,
            model: Some("Pixel 9".to_string()),
            ..sample_device()
        };
        assert_eq!(device.display_name(), "Pixel 9");
    }

    #[test]
    fn test_device_os_label_and_icon() {
        let device = sample_device();
        assert_eq!(device.os_label(), "Windows 11");
        assert_eq!(device.icon_key(), "laptop");
    }

    #[test]
    fn test_parse_capabilities_response() {
        let json = r#"{
            "device_id": "dev-7f3a",
            "capabilities": ["battery"],
            "available_tests": [
                {"id": "battery.health", "name": "Battery Health Check", "duration": "30s"},
                {"id": "display.pixels", "name": "Pixel Test", "duration": "manual"}
            ]
        }"#;

        let catalog: CapabilitiesResponse = serde_json::from_str(json).unwrap();
        assert_eq!(catalog.device_id, "dev-7f3a");
        assert_eq!(catalog.available_tests.len(), 2);
        assert_eq!(catalog.available_tests[0].category(), "battery");
        assert_eq!(catalog.available_tests[1].duration, "manual");
    }

    #[test]
    fn test_parse_test_result_with_metrics() {
        let json = r#"{
            "test_id": "battery.health",
            "category": "power",
            "status": "warn",
            "metrics": {"capacity_pct": 78.5, "cycle_count": 412},
            "explanation": "Battery capacity degraded",
            "confidence": 0.92,
            "advisories": ["Consider battery replacement"],
            "timestamp": "2025-08-25T10:15:00"
        }"#;

        let result: TestResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.status(), TestStatus::Warn);
        assert_eq!(result.severity(), Some(1));
        // Result category comes from the executor, not the id prefix.
        assert_eq!(result.category, "power");
        assert_eq!(result.icon_key(), "zap");
        assert_eq!(result.metrics["cycle_count"], 412);
    }

    #[test]
    fn test_parse_test_result_sparse_fields() {
        let json = r#"{"test_id": "memory.test", "category": "performance", "status": "pass"}"#;
        let result: TestResult = serde_json::from_str(json).unwrap();
        assert!(result.advisories.is_empty());
        assert!(result.explanation.is_empty());
        assert_eq!(result.confidence, 0.0);
        assert!(result.metrics.is_null());
    }

    #[test]
    fn test_summary_is_consistent() {
        let results = vec![
            sample_result("battery.health", "power", "pass"),
            sample_result("storage.health", "storage", "warn"),
            sample_result("cpu.stress", "performance", "fail"),
        ];
        let summary = sample_summary(1, 1, 1, 0);
        assert!(summary.is_consistent(&results));
    }

    #[test]
    fn test_summary_inconsistent_counts() {
        let results = vec![
            sample_result("battery.health", "power", "pass"),
            sample_result("storage.health", "storage", "pass"),
        ];
        // Claims a failure that is not present in the results.
        let summary = sample_summary(1, 0, 1, 0);
        assert!(!summary.is_consistent(&results));
    }

    #[test]
    fn test_summary_inconsistent_total() {
        let results = vec![sample_result("battery.health", "power", "pass")];
        let mut summary = sample_summary(1, 0, 0, 0);
        summary.total_tests = 5;
        assert!(!summary.is_consistent(&results));
    }

    #[test]
    fn test_summary_tolerates_unrecognized_status() {
        // Unknown statuses land in no bucket but still count toward the total.
        let results = vec![
            sample_result("battery.health", "power", "pass"),
            sample_result("display.pixels", "display", "skipped"),
        ];
        let mut summary = sample_summary(1, 0, 0, 0);
        summary.total_tests = 2;
        assert!(summary.is_consistent(&results));
    }

    #[test]
    fn test_summary_health_helpers() {
        let healthy = sample_summary(4, 1, 0, 0);
        assert!(healthy.is_healthy());
        assert_eq!(healthy.problem_count(), 0);

        let broken = sample_summary(2, 0, 1, 1);
        assert!(!broken.is_healthy());
        assert_eq!(broken.problem_count(), 2);
    }

    #[test]
    fn test_diagnostic_request_serialization() {
        let request = DiagnosticRequest::new(
            "dev-7f3a",
            vec!["battery.health".to_string(), "cpu.stress".to_string()],
        );
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["device_id"], "dev-7f3a");
        assert_eq!(json["tests"][1], "cpu.stress");
        // The executor requires an options object, not null.
        assert!(json["options"].is_object());
        assert_eq!(json["options"], serde_json::json!({}));
    }

    #[test]
    fn test_parse_diagnostic_response() {
        let json = r#"{
            "device": {
                "id": "dev-7f3a",
                "device_class": "laptop",
                "os": "Windows",
                "os_version": "11",
                "connected_at": "2025-08-25T10:12:00"
            },
            "results": [
                {"test_id": "battery.health", "category": "power", "status": "pass"}
            ],
            "summary": {
                "total_tests": 1,
                "passed": 1,
                "warnings": 0,
                "failed": 0,
                "errors": 0,
                "health_score": 100.0,
                "overall_status": "healthy"
            },
            "report_id": "report_dev-7f3a_1724580000"
        }"#;

        let response: DiagnosticResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 1);
        assert!(response.summary.is_consistent(&response.results));
        assert_eq!(response.report_id, "report_dev-7f3a_1724580000");
    }

    #[test]
    fn test_parse_health_status() {
        let json = r#"{"status": "healthy", "timestamp": "2025-08-25T10:00:00", "connected_devices": 1}"#;
        let health: HealthStatus = serde_json::from_str(json).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.connected_devices, 1);
    }
}
