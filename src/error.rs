//! Error types for settle
//!
//! Uses `thiserror` for library errors. Sentinel watch outcomes
//! (signal/stop/timeout) are not errors; see [`crate::WatchOutcome`].

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for settle operations
pub type SettleResult<T> = Result<T, SettleError>;

/// Main error type for settle operations
#[derive(Error, Debug)]
pub enum SettleError {
    /// A watched path does not exist at session construction time
    #[error("watched path not found: {path}")]
    PathNotFound { path: PathBuf },

    /// `watch` was called on a handle that has been closed
    #[error("watch session is closed")]
    Closed,

    /// A `watch` call is already in flight on this handle
    #[error("a watch is already in progress on this session")]
    WatchInProgress,

    /// The backend hit an unrecoverable native error while running
    #[error("watch backend error: {message}")]
    Backend { message: String },

    /// Installing the process signal handler failed
    #[error("failed to install signal handler: {message}")]
    SignalHandler { message: String },

    /// IO error while validating watch paths
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SettleError {
    pub(crate) fn backend(err: impl std::fmt::Display) -> Self {
        SettleError::Backend {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_display_path_not_found() {
        let err = SettleError::PathNotFound {
            path: PathBuf::from("/tmp/missing"),
        };
        assert_eq!(err.to_string(), "watched path not found: /tmp/missing");
    }

    #[test]
    fn test_error_display_closed() {
        assert_eq!(SettleError::Closed.to_string(), "watch session is closed");
    }

    #[test]
    fn test_error_display_backend() {
        let err = SettleError::backend("inotify limit reached");
        assert_eq!(
            err.to_string(),
            "watch backend error: inotify limit reached"
        );
    }
}
