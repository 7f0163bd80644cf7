//! HTTP client for the diagnostic executor
//!
//! All methods return [`Error::Backend`] on failure. When the executor
//! responds with a JSON `detail` field, that string is carried verbatim so it
//! can be shown to the user unchanged; otherwise a fixed per-operation
//! fallback message is used. The detect and capabilities calls share one
//! fallback because they belong to the same user-visible operation.

use std::time::Duration;

use serde::de::DeserializeOwned;

use udiag_core::prelude::*;

use crate::models::{
    CapabilitiesResponse, Device, DiagnosticRequest, DiagnosticResponse, HealthStatus,
};

/// Default executor address, matching the executor's own default bind
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Default per-request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Generic failure message for the detection operation (both calls)
const DETECT_FALLBACK: &str = "failed to detect device";

/// Generic failure message for a diagnostic run
const RUN_FALLBACK: &str = "failed to run diagnostics";

/// Generic failure message for the liveness probe
const HEALTH_FALLBACK: &str = "executor health check failed";

/// Thin async wrapper over the executor's HTTP endpoints
#[derive(Debug, Clone)]
pub struct DiagnosticsClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DiagnosticsClient {
    /// Create a client for the executor at `base_url`.
    ///
    /// A trailing slash on the base URL is tolerated and stripped.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::startup(format!("failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            timeout,
        })
    }

    /// The executor address this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the executor to detect the connected device
    pub async fn detect_device(&self) -> Result<Device> {
        let url = self.endpoint_url("/api/device/detect");
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e, DETECT_FALLBACK))?;

        parse_json(response, DETECT_FALLBACK).await
    }

    /// Fetch the applicable test catalog for a detected device
    pub async fn list_capabilities(&self, device_id: &str) -> Result<CapabilitiesResponse> {
        let url = self.endpoint_url(&format!("/api/device/{}/capabilities", device_id));
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e, DETECT_FALLBACK))?;

        parse_json(response, DETECT_FALLBACK).await
    }

    /// Submit a diagnostic run and wait for the full result payload
    pub async fn run_diagnostics(&self, request: &DiagnosticRequest) -> Result<DiagnosticResponse> {
        let url = self.endpoint_url("/api/diagnostics/run");
        debug!(
            "POST {} ({} tests for {})",
            url,
            request.tests.len(),
            request.device_id
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e, RUN_FALLBACK))?;

        parse_json(response, RUN_FALLBACK).await
    }

    /// Probe executor liveness
    pub async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint_url("/api/health");
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| self.transport_error(e, HEALTH_FALLBACK))?;

        parse_json(response, HEALTH_FALLBACK).await
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Map a transport-level failure to a user-facing message.
    ///
    /// reqwest's own messages name internals (URLs, hyper errors), so they
    /// only ride along after the fixed fallback text.
    fn transport_error(&self, e: reqwest::Error, fallback: &str) -> Error {
        if e.is_timeout() {
            Error::backend(format!(
                "{} (timed out after {}s)",
                fallback,
                self.timeout.as_secs()
            ))
        } else if e.is_connect() {
            Error::backend(format!(
                "{} (executor not reachable at {})",
                fallback, self.base_url
            ))
        } else {
            Error::backend(format!("{}: {}", fallback, e))
        }
    }
}

/// Turn an executor response into `T`, or into a Backend error.
///
/// Non-2xx responses carry `{"detail": "..."}` in the common case. The detail
/// string becomes the error verbatim; anything else falls back to the fixed
/// per-operation message.
async fn parse_json<T: DeserializeOwned>(response: reqwest::Response, fallback: &str) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Executor request failed with HTTP {}", status);
        debug!("Executor error body: {}", body);

        let message = extract_detail(&body).unwrap_or_else(|| fallback.to_string());
        return Err(Error::backend(message));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| Error::backend(format!("{}: invalid response body ({})", fallback, e)))
}

/// Pull the `detail` string out of an executor error body, if there is one
fn extract_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?.as_str()?.trim();

    if detail.is_empty() {
        None
    } else {
        Some(detail.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_client(base_url: &str) -> DiagnosticsClient {
        DiagnosticsClient::new(base_url, DEFAULT_TIMEOUT).unwrap()
    }

    #[test]
    fn test_endpoint_url_joining() {
        let client = sample_client("http://127.0.0.1:8000");
        assert_eq!(
            client.endpoint_url("/api/device/detect"),
            "http://127.0.0.1:8000/api/device/detect"
        );
        assert_eq!(
            client.endpoint_url("/api/device/dev-1/capabilities"),
            "http://127.0.0.1:8000/api/device/dev-1/capabilities"
        );
    }

    #[test]
    fn test_trailing_slash_is_stripped() {
        let client = sample_client("http://localhost:9000/");
        assert_eq!(client.base_url(), "http://localhost:9000");
        assert_eq!(
            client.endpoint_url("/api/health"),
            "http://localhost:9000/api/health"
        );
    }

    #[test]
    fn test_extract_detail_present() {
        let body = r#"{"detail": "Device not found"}"#;
        assert_eq!(extract_detail(body), Some("Device not found".to_string()));
    }

    #[test]
    fn test_extract_detail_verbatim() {
        // The detail string must pass through unmodified; the session shows
        // it to the user exactly as the executor wrote it.
        let body = r#"{"detail": "Diagnostic execution failed: executor unreachable"}"#;
        assert_eq!(
            extract_detail(body),
            Some("Diagnostic execution failed: executor unreachable".to_string())
        );
    }

    #[test]
    fn test_extract_detail_missing_or_malformed() {
        assert_eq!(extract_detail("not json at all"), None);
        assert_eq!(extract_detail(r#"{"error": "nope"}"#), None);
        assert_eq!(extract_detail(r#"{"detail": 42}"#), None);
        assert_eq!(extract_detail(r#"{"detail": ""}"#), None);
        assert_eq!(extract_detail(r#"{"detail": "   "}"#), None);
        assert_eq!(extract_detail(""), None);
    }

    #[test]
    fn test_default_constants() {
        assert_eq!(DEFAULT_BASE_URL, "http://127.0.0.1:8000");
        assert_eq!(DEFAULT_TIMEOUT, Duration::from_secs(30));
    }
}
