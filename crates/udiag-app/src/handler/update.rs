//! Main update function: every session transition in one place
//!
//! Precondition violations are silent no-ops, logged at debug level and
//! never surfaced as errors: with an asynchronous front-end a stale button
//! press is ordinary traffic, and the session must not corrupt state over
//! it. Detect and Run are two-phase: the synchronous half here flips the
//! busy flag (and, for Run, the stage) before any network traffic starts,
//! and the asynchronous half resolves through a completion message tagged
//! with the attempt id.

use udiag_api::{AvailableTest, Device, DiagnosticResponse};
use udiag_core::prelude::*;
use udiag_core::Stage;

use crate::handler::{UpdateAction, UpdateResult};
use crate::message::Message;
use crate::session::Session;

/// Process a message against the session
pub fn update(session: &mut Session, message: Message) -> UpdateResult {
    match message {
        // ─────────────────────────────────────────────────────────
        // User intents
        // ─────────────────────────────────────────────────────────
        Message::DetectRequested => handle_detect_requested(session),
        Message::ToggleTest { test_id } => handle_toggle_test(session, &test_id),
        Message::SelectAllTests => handle_select_all(session),
        Message::ClearSelection => handle_clear_selection(session),
        Message::RunRequested => handle_run_requested(session),
        Message::RunNewTests => handle_run_new_tests(session),
        Message::ScanNewDevice => handle_scan_new_device(session),
        Message::Quit => handle_quit(session),

        // ─────────────────────────────────────────────────────────
        // Request completions
        // ─────────────────────────────────────────────────────────
        Message::DetectCompleted {
            attempt,
            device,
            tests,
        } => handle_detect_completed(session, attempt, device, tests),
        Message::DetectFailed { attempt, error } => {
            handle_detect_failed(session, attempt, error)
        }
        Message::RunCompleted { attempt, response } => {
            handle_run_completed(session, attempt, *response)
        }
        Message::RunFailed { attempt, error } => handle_run_failed(session, attempt, error),
    }
}

fn handle_detect_requested(session: &mut Session) -> UpdateResult {
    if session.stage != Stage::Detecting {
        debug!("Ignoring detect request in stage {}", session.stage);
        return UpdateResult::none();
    }
    if session.is_busy() {
        debug!("Ignoring detect request while a request is outstanding");
        return UpdateResult::none();
    }

    // A stale error must never linger into a new attempt.
    session.last_error = None;
    let attempt = session.begin_attempt();
    info!("Starting device detection (attempt {})", attempt);

    UpdateResult::action(UpdateAction::StartDetect { attempt })
}

fn handle_toggle_test(session: &mut Session, test_id: &str) -> UpdateResult {
    if session.stage != Stage::Selecting || session.is_busy() {
        debug!(
            "Ignoring toggle of {} in stage {}",
            test_id, session.stage
        );
        return UpdateResult::none();
    }

    session.toggle_test(test_id);
    debug!(
        "Toggled {}, {} tests selected",
        test_id,
        session.selected.len()
    );
    UpdateResult::none()
}

fn handle_select_all(session: &mut Session) -> UpdateResult {
    if session.stage != Stage::Selecting || session.is_busy() {
        debug!("Ignoring select-all in stage {}", session.stage);
        return UpdateResult::none();
    }

    session.select_all();
    debug!("Selected all {} catalog tests", session.selected.len());
    UpdateResult::none()
}

fn handle_clear_selection(session: &mut Session) -> UpdateResult {
    if session.stage != Stage::Selecting || session.is_busy() {
        debug!("Ignoring clear-selection in stage {}", session.stage);
        return UpdateResult::none();
    }

    session.selected.clear();
    UpdateResult::none()
}

fn handle_run_requested(session: &mut Session) -> UpdateResult {
    if session.stage != Stage::Selecting {
        debug!("Ignoring run request in stage {}", session.stage);
        return UpdateResult::none();
    }
    if session.is_busy() {
        debug!("Ignoring run request while a request is outstanding");
        return UpdateResult::none();
    }
    if !session.has_selection() {
        debug!("Ignoring run request with an empty selection");
        return UpdateResult::none();
    }
    let device_id = match session.device.as_ref() {
        Some(device) => device.id.clone(),
        None => {
            // Selecting without a device would mean a broken detect; refuse
            // rather than submitting a run for nothing.
            warn!("Run requested without a detected device");
            return UpdateResult::none();
        }
    };

    let tests = session.selected_tests();
    session.last_error = None;
    // Stage flips before the request goes out so "in progress" is visible
    // immediately; a failure reverts it (selection intact).
    session.stage = Stage::Running;
    let attempt = session.begin_attempt();
    info!(
        "Starting diagnostic run of {} tests on {} (attempt {})",
        tests.len(),
        device_id,
        attempt
    );

    UpdateResult::action(UpdateAction::StartRun {
        attempt,
        device_id,
        tests,
    })
}

fn handle_run_new_tests(session: &mut Session) -> UpdateResult {
    if session.stage != Stage::Results || session.is_busy() {
        debug!("Ignoring run-new-tests in stage {}", session.stage);
        return UpdateResult::none();
    }

    info!("Returning to test selection");
    session.reset_for_new_run();
    UpdateResult::none()
}

fn handle_scan_new_device(session: &mut Session) -> UpdateResult {
    if session.stage != Stage::Results || session.is_busy() {
        debug!("Ignoring scan-new-device in stage {}", session.stage);
        return UpdateResult::none();
    }

    info!("Resetting session for a new device scan");
    session.reset_for_new_device();
    UpdateResult::none()
}

fn handle_quit(session: &mut Session) -> UpdateResult {
    info!("Quit requested");
    session.quit_requested = true;
    UpdateResult::none()
}

fn handle_detect_completed(
    session: &mut Session,
    attempt: u64,
    device: Device,
    tests: Vec<AvailableTest>,
) -> UpdateResult {
    if !session.finish_attempt(attempt) {
        debug!("Discarding stale detect completion (attempt {})", attempt);
        return UpdateResult::none();
    }

    info!(
        "Detected device {} with {} applicable tests",
        device.id,
        tests.len()
    );
    session.install_detection(device, tests);
    UpdateResult::none()
}

fn handle_detect_failed(session: &mut Session, attempt: u64, error: String) -> UpdateResult {
    if !session.finish_attempt(attempt) {
        debug!("Discarding stale detect failure (attempt {})", attempt);
        return UpdateResult::none();
    }

    warn!("Device detection failed: {}", error);
    // Atomicity: a failed detect leaves neither device nor catalog behind.
    session.clear_detection();
    session.last_error = Some(error);
    UpdateResult::none()
}

fn handle_run_completed(
    session: &mut Session,
    attempt: u64,
    response: DiagnosticResponse,
) -> UpdateResult {
    if !session.finish_attempt(attempt) {
        debug!("Discarding stale run completion (attempt {})", attempt);
        return UpdateResult::none();
    }

    info!(
        "Diagnostic run {} completed: {}/{} passed, health score {}",
        response.report_id,
        response.summary.passed,
        response.summary.total_tests,
        response.summary.health_score
    );
    session.last_response = Some(response);
    session.stage = Stage::Results;
    UpdateResult::none()
}

fn handle_run_failed(session: &mut Session, attempt: u64, error: String) -> UpdateResult {
    if !session.finish_attempt(attempt) {
        debug!("Discarding stale run failure (attempt {})", attempt);
        return UpdateResult::none();
    }

    warn!("Diagnostic run failed: {}", error);
    session.last_error = Some(error);
    // Back to selection, selection intact, so the user can retry as-is.
    session.stage = Stage::Selecting;
    UpdateResult::none()
}
