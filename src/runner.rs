//! Session runner - main event loop for the udiag binary
//!
//! Drives the engine from two input sources (stdin commands and executor
//! completion messages) and mirrors engine events to stdout as NDJSON.
//! In `--auto` mode the loop chains the whole workflow without input:
//! detect, select everything, run, report, quit.

use tokio::sync::{broadcast, mpsc};

use udiag_api::{DiagnosticResponse, TestResult};
use udiag_app::{Engine, EngineEvent, Message};
use udiag_core::prelude::*;

use crate::output::SessionEvent;

/// Run the session loop.
///
/// Returns the number of problem results (failed or errored tests) seen in
/// the last completed run, which the caller turns into the exit status.
pub async fn run(mut engine: Engine, auto: bool) -> Result<usize> {
    info!("═══════════════════════════════════════════════════════");
    info!("udiag session starting");
    info!("Executor: {}", engine.client().base_url());
    info!("═══════════════════════════════════════════════════════");

    SessionEvent::started(engine.client().base_url()).emit();

    // Liveness probe. Informative only; detection proceeds regardless.
    match engine.client().health().await {
        Ok(health) => {
            info!(
                "Executor healthy ({} device(s) connected)",
                health.connected_devices
            );
            SessionEvent::executor_health(&health).emit();
        }
        Err(e) => warn!("Executor health probe failed: {}", e),
    }

    // Spawn the stdin command reader
    let stdin_tx = engine.msg_sender();
    std::thread::spawn(move || {
        stdin_reader_blocking(stdin_tx);
    });

    if !auto {
        print_command_hints();
    }

    // Detection starts immediately; the user never has to ask for it.
    let _ = engine.msg_tx.try_send(Message::DetectRequested);

    let mut events = engine.subscribe();
    let mut problems = 0usize;
    let mut auto_failure: Option<String> = None;

    // Main event loop
    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        match engine.msg_rx.recv().await {
            Some(msg) => {
                engine.process_message(msg);
                mirror_engine_events(&engine, &mut events, auto, &mut problems, &mut auto_failure);
            }
            None => {
                info!("Message channel closed");
                break;
            }
        }
    }

    engine.shutdown().await;
    info!("udiag session exiting");

    match auto_failure {
        Some(error) => Err(Error::backend(error)),
        None => Ok(problems),
    }
}

/// Drain engine events and mirror them to stdout.
///
/// In auto mode this is also where the workflow is chained: a detected
/// device triggers select-all plus run, and a finished (or failed) run
/// triggers quit.
fn mirror_engine_events(
    engine: &Engine,
    events: &mut broadcast::Receiver<EngineEvent>,
    auto: bool,
    problems: &mut usize,
    auto_failure: &mut Option<String>,
) {
    while let Ok(event) = events.try_recv() {
        match event {
            EngineEvent::StageChanged { from, to } => {
                SessionEvent::stage_changed(from, to).emit();
            }
            EngineEvent::DeviceDetected { device, test_count } => {
                SessionEvent::device_detected(&device, test_count).emit();
                for test in &engine.session.available_tests {
                    SessionEvent::test_available(test).emit();
                }
                if auto {
                    // Run everything the catalog offers.
                    let _ = engine.msg_tx.try_send(Message::SelectAllTests);
                    let _ = engine.msg_tx.try_send(Message::RunRequested);
                }
            }
            EngineEvent::DiagnosticsCompleted { .. } => {
                if let Some(response) = &engine.session.last_response {
                    *problems = emit_results(response);
                }
                if auto {
                    let _ = engine.msg_tx.try_send(Message::Quit);
                }
            }
            EngineEvent::SessionFailed { error } => {
                SessionEvent::session_error(&error).emit();
                if auto {
                    *auto_failure = Some(error);
                    let _ = engine.msg_tx.try_send(Message::Quit);
                }
            }
            EngineEvent::Shutdown => {}
        }
    }
}

/// Emit per-result events grouped by executor category, then the summary.
///
/// Returns the number of problem results in the run.
fn emit_results(response: &DiagnosticResponse) -> usize {
    let mut problems = 0;
    for (_, members) in group_results(&response.results) {
        for result in members {
            if result.status().is_problem() {
                problems += 1;
            }
            SessionEvent::test_result(result).emit();
        }
    }

    SessionEvent::summary(&response.summary, &response.report_id).emit();
    problems
}

/// Group results by executor category for display.
///
/// Group order follows first appearance in the result list, and results
/// keep their executor order within each group. Nothing is re-sorted.
fn group_results(results: &[TestResult]) -> Vec<(&str, Vec<&TestResult>)> {
    let mut groups: Vec<(&str, Vec<&TestResult>)> = Vec::new();
    for result in results {
        let category = result.category.as_str();
        match groups.iter_mut().find(|(name, _)| *name == category) {
            Some((_, members)) => members.push(result),
            None => groups.push((category, vec![result])),
        }
    }
    groups
}

/// Read stdin line commands and forward them as messages (blocking)
fn stdin_reader_blocking(msg_tx: mpsc::Sender<Message>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        match line {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                match parse_command(trimmed) {
                    Some(Message::Quit) => {
                        info!("Stdin: quit requested");
                        let _ = msg_tx.blocking_send(Message::Quit);
                        break;
                    }
                    Some(msg) => {
                        info!("Stdin: {} requested", msg.name());
                        let _ = msg_tx.blocking_send(msg);
                    }
                    None => {
                        warn!("Unknown stdin command: {}", trimmed);
                    }
                }
            }
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        }
    }

    info!("Stdin reader exiting");
}

/// Map one input line to a session message
fn parse_command(line: &str) -> Option<Message> {
    if let Some(rest) = line
        .strip_prefix("t ")
        .or_else(|| line.strip_prefix("toggle "))
    {
        let test_id = rest.trim();
        if test_id.is_empty() {
            return None;
        }
        return Some(Message::ToggleTest {
            test_id: test_id.to_string(),
        });
    }

    match line {
        "d" | "detect" => Some(Message::DetectRequested),
        "a" | "all" => Some(Message::SelectAllTests),
        "c" | "clear" => Some(Message::ClearSelection),
        "r" | "run" => Some(Message::RunRequested),
        "n" | "new" => Some(Message::RunNewTests),
        "s" | "scan" => Some(Message::ScanNewDevice),
        "q" | "quit" => Some(Message::Quit),
        _ => None,
    }
}

/// Print the interactive command reference to stderr
fn print_command_hints() {
    eprintln!("udiag commands (one per line on stdin):");
    eprintln!("  d | detect        detect the connected device again");
    eprintln!("  t <id> | toggle   toggle one test, e.g. `t battery.health`");
    eprintln!("  a | all           select every available test");
    eprintln!("  c | clear         clear the selection");
    eprintln!("  r | run           run the selected tests");
    eprintln!("  n | new           back to selection for another run");
    eprintln!("  s | scan          forget this device and detect a new one");
    eprintln!("  q | quit          exit");
}
