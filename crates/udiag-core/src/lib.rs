//! # udiag-core - Core Domain Types
//!
//! Foundation crate for udiag. Provides the session stage machine, the
//! result classifier, error handling, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Session Stages (`stage`)
//! - [`Stage`] - Guided workflow stage (Detecting, Selecting, Running, Results)
//!
//! ### Result Classification (`classify`)
//! - [`TestStatus`] - Canonical per-test outcome parsed from executor status strings
//! - [`category_of()`] - Grouping key derived from a test identifier
//! - [`group_icon_key()`], [`display_label()`] - Presentation lookups with fallbacks
//! - [`device_icon_key()`] - Icon lookup for a device class
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use udiag_core::prelude::*;
//! ```

pub mod classify;
pub mod error;
pub mod logging;
pub mod stage;

/// Prelude for common imports used throughout all udiag crates
pub mod prelude {
    pub use super::error::{Error, Result, ResultExt};
    pub use tracing::{debug, error, info, instrument, trace, warn};
}

// Re-export commonly used types at crate root for convenience
pub use classify::{category_of, device_icon_key, display_label, group_icon_key, TestStatus};
pub use error::{Error, Result, ResultExt};
pub use stage::Stage;
