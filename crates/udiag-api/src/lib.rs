//! # udiag-api - Executor Wire Protocol
//!
//! HTTP client and wire types for the diagnostic executor service.
//! The executor owns detection, the test catalog, and diagnostic runs;
//! this crate only speaks its JSON protocol and never interprets results
//! beyond deserialization.
//!
//! ## Public API
//!
//! ### Wire Types (`models`)
//! - [`Device`] - A detected device with identity and capability strings
//! - [`AvailableTest`] - One catalog entry the user can select
//! - [`CapabilitiesResponse`] - Catalog payload for a detected device
//! - [`TestResult`], [`Summary`], [`DiagnosticResponse`] - Run output
//! - [`DiagnosticRequest`] - Run submission payload
//! - [`HealthStatus`] - Executor liveness payload
//!
//! ### Client (`client`)
//! - [`DiagnosticsClient`] - Thin async wrapper over the executor endpoints

pub mod client;
pub mod models;

pub use client::{DiagnosticsClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use models::{
    AvailableTest, CapabilitiesResponse, Device, DiagnosticRequest, DiagnosticResponse,
    HealthStatus, Summary, TestResult,
};
