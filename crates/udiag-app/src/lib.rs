//! udiag-app - Session state and orchestration for Universal Diagnostics
//!
//! This crate implements the TEA (The Elm Architecture) pattern for session
//! state management, the Engine abstraction for shared orchestration, and
//! configuration loading. Frontends feed `Message`s into the engine and
//! observe `EngineEvent`s; all executor traffic happens in spawned tasks.

pub mod actions;
pub mod config;
pub mod engine;
pub mod engine_event;
pub mod handler;
pub mod message;
pub mod session;
pub mod signals;

// Re-export primary types
pub use engine::Engine;
pub use engine_event::EngineEvent;
pub use handler::{update, UpdateAction, UpdateResult};
pub use message::Message;
pub use session::Session;

// Re-export wire types frontends render from
pub use udiag_api::{AvailableTest, Device, DiagnosticResponse, Summary, TestResult};
