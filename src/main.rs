//! Universal Diagnostics - guided device diagnostics from the terminal
//!
//! This is the binary entry point. Session logic lives in the workspace
//! crates; this file only parses arguments, wires up logging and config,
//! and hands an Engine to the runner.

mod output;
mod runner;

use std::path::PathBuf;

use clap::Parser;

use udiag_app::config;
use udiag_app::Engine;
use udiag_core::prelude::*;

/// Universal Diagnostics - guided device diagnostics from the terminal
#[derive(Parser, Debug)]
#[command(name = "udiag")]
#[command(about = "Guided device diagnostics against a local executor", long_about = None)]
struct Args {
    /// Path to a config file (defaults to the user config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Executor base URL (overrides config)
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Per-request timeout in seconds (overrides config)
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Run one unattended session: detect, run every test, report, exit.
    /// The exit status is non-zero when any test fails or errors.
    #[arg(long)]
    auto: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()
        .map_err(|e| Error::startup(format!("Failed to install error hooks: {}", e)))?;

    let args = Args::parse();

    udiag_core::logging::init()?;

    // A missing config directory is not fatal; defaults cover it.
    if let Err(e) = config::init_config_dir() {
        warn!("Could not create default config: {}", e);
    }

    let mut settings = match &args.config {
        Some(path) => config::load_settings_file(path),
        None => config::load_settings(),
    };
    if let Some(url) = args.url {
        settings.backend.url = url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.backend.timeout_secs = timeout_secs;
    }

    let engine = Engine::new(settings)?;
    let problems = runner::run(engine, args.auto).await?;

    if problems > 0 {
        info!("Exiting with failure status: {} problem result(s)", problems);
        std::process::exit(1);
    }

    Ok(())
}
