//! Settings parser for the user-level config.toml

use std::path::{Path, PathBuf};

use udiag_core::prelude::*;

use super::types::Settings;

const CONFIG_FILENAME: &str = "config.toml";
const UDIAG_DIR: &str = "udiag";

/// Directory holding the user-level configuration, if one can be resolved
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(UDIAG_DIR))
}

/// Load settings from the user-level config.toml
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings() -> Settings {
    match config_dir() {
        Some(dir) => load_settings_from(&dir),
        None => {
            debug!("No user config directory, using defaults");
            Settings::default()
        }
    }
}

/// Load settings from `dir`/config.toml
pub fn load_settings_from(dir: &Path) -> Settings {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        debug!("No config file at {:?}, using defaults", config_path);
        return Settings::default();
    }

    parse_settings(&config_path)
}

/// Load settings from an explicitly named config file
///
/// Used for the `--config` override. A missing file is worth a warning
/// here, since the user asked for it by name.
pub fn load_settings_file(path: &Path) -> Settings {
    if !path.exists() {
        warn!("Config file {:?} does not exist, using defaults", path);
        return Settings::default();
    }

    parse_settings(path)
}

fn parse_settings(config_path: &Path) -> Settings {
    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}

/// Create a default config.toml in the user config directory
pub fn init_config_dir() -> Result<()> {
    let dir = config_dir()
        .ok_or_else(|| Error::config("Could not resolve user config directory".to_string()))?;
    init_config_dir_at(&dir)
}

/// Create a default config.toml under `dir`, leaving an existing one alone
pub fn init_config_dir_at(dir: &Path) -> Result<()> {
    if !dir.exists() {
        std::fs::create_dir_all(dir)
            .map_err(|e| Error::config(format!("Failed to create config dir: {}", e)))?;
    }

    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        let default_content = r#"# Universal Diagnostics Configuration

[backend]
url = "http://127.0.0.1:8000"   # Diagnostic executor address
timeout_secs = 30               # Per-request timeout
"#;
        std::fs::write(&config_path, default_content)
            .map_err(|e| Error::config(format!("Failed to write config.toml: {}", e)))?;
    }

    Ok(())
}
