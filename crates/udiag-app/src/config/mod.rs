//! Configuration loading for the session controller
//!
//! Settings live in a user-level `config.toml` (for example
//! `~/.config/udiag/config.toml` on Linux). Missing or unparseable files
//! fall back to defaults so the tool always starts.

pub mod settings;
pub mod types;

pub use settings::{config_dir, init_config_dir, load_settings, load_settings_file};
pub use types::*;
