//! Application error types with rich context

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Application error types organized by layer/domain
#[derive(Debug, Error)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Common/Infrastructure Errors
    // ─────────────────────────────────────────────────────────────
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ─────────────────────────────────────────────────────────────
    // Executor Errors
    // ─────────────────────────────────────────────────────────────
    /// Failure reported by (or while reaching) the diagnostic executor.
    ///
    /// The message is either the executor's own `detail` string or a fixed
    /// per-operation fallback, and is surfaced to the user verbatim, so no
    /// prefix is added here.
    #[error("{message}")]
    Backend { message: String },

    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ─────────────────────────────────────────────────────────────
    // Startup Errors
    // ─────────────────────────────────────────────────────────────
    #[error("Startup error: {message}")]
    Startup { message: String },
}

// ─────────────────────────────────────────────────────────────────
// Convenience Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn startup(message: impl Into<String>) -> Self {
        Self::Startup {
            message: message.into(),
        }
    }

    /// Check if this is a recoverable error
    ///
    /// Executor failures are always retryable from the session's point of
    /// view, and configuration problems fall back to built-in defaults.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Backend { .. } | Error::Config { .. })
    }

    /// Check if this error should trigger application exit
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Startup { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Context Extensions (for use with color-eyre)
// ─────────────────────────────────────────────────────────────────

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", context.into(), err);
            err
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err = e.into();
            tracing::error!("{}: {:?}", f(), err);
            err
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_displays_message_verbatim() {
        // Executor detail strings are shown to the user unchanged, so the
        // Display impl must not decorate them.
        let err = Error::backend("executor unreachable");
        assert_eq!(err.to_string(), "executor unreachable");
    }

    #[test]
    fn test_error_display_messages() {
        let err = Error::config("missing url");
        assert_eq!(err.to_string(), "Configuration error: missing url");

        let err = Error::startup("logging init failed");
        assert_eq!(err.to_string(), "Startup error: logging init failed");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_recoverable() {
        assert!(Error::backend("timed out").is_recoverable());
        assert!(Error::config("bad toml").is_recoverable());
        assert!(!Error::startup("no terminal").is_recoverable());
    }

    #[test]
    fn test_error_is_fatal() {
        assert!(Error::startup("no terminal").is_fatal());
        assert!(!Error::backend("timed out").is_fatal());
        assert!(!Error::config("bad toml").is_fatal());
    }

    #[test]
    fn test_error_constructors() {
        let _ = Error::backend("test");
        let _ = Error::config("test");
        let _ = Error::startup("test");
    }
}
