//! Configuration types for the session controller

use serde::{Deserialize, Serialize};

use udiag_api::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

/// Application settings (config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub backend: BackendSettings,
}

/// Executor connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendSettings {
    /// Base URL of the diagnostic executor
    #[serde(default = "default_url")]
    pub url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.backend.url, "http://127.0.0.1:8000");
        assert_eq!(settings.backend.timeout_secs, 30);
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.backend.url, "http://127.0.0.1:8000");
        assert_eq!(settings.backend.timeout_secs, 30);
    }

    #[test]
    fn test_partial_backend_section() {
        let settings: Settings = toml::from_str(
            r#"
[backend]
url = "http://diag-host:9000"
"#,
        )
        .unwrap();

        assert_eq!(settings.backend.url, "http://diag-host:9000");
        // Unspecified fields keep their defaults.
        assert_eq!(settings.backend.timeout_secs, 30);
    }

    #[test]
    fn test_full_backend_section() {
        let settings: Settings = toml::from_str(
            r#"
[backend]
url = "http://127.0.0.1:8080"
timeout_secs = 120
"#,
        )
        .unwrap();

        assert_eq!(settings.backend.url, "http://127.0.0.1:8080");
        assert_eq!(settings.backend.timeout_secs, 120);
    }

    #[test]
    fn test_settings_round_trip() {
        let mut settings = Settings::default();
        settings.backend.timeout_secs = 45;

        let serialized = toml::to_string(&settings).unwrap();
        let parsed: Settings = toml::from_str(&serialized).unwrap();
        assert_eq!(parsed.backend.timeout_secs, 45);
    }
}
