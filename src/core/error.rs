//! Error taxonomy for one reconciliation run.
//!
//! Errors are classified by what the caller should do next:
//! - `EngineError`: the run failed as a whole; the next scheduled run retries
//!   from the store's last good state.
//! - `StoreError`: reading or writing the entry set failed.
//! - `DispatchError`: the notifier call failed as a whole. Partial delivery
//!   failures are not errors; undelivered entries stay eligible for the
//!   next run.

use thiserror::Error;

/// Failure of a full `process()` run.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("could not read entries from store: {0}")]
    StoreRead(#[source] StoreError),

    #[error("entries were computed but could not be written back: {0}")]
    StoreWrite(#[source] StoreError),

    #[error("run cancelled before dispatch, store left untouched")]
    Cancelled,
}

impl EngineError {
    /// Returns true if the run was stopped by a shutdown signal rather
    /// than an actual failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Cancelled)
    }
}

/// Failure at the entry store boundary.
///
/// A single malformed row is not an error: the store skips it with a
/// warning so one bad record never aborts the whole read.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store codec error: {0}")]
    Codec(#[from] csv::Error),
}

/// Total failure of a notifier call or probe.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail service error (HTTP {code}): {message}")]
    BadResponse { code: u16, message: String },

    #[error("invalid mail request: {0}")]
    InvalidRequest(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancelled_classification() {
        assert!(EngineError::Cancelled.is_cancelled());

        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!EngineError::StoreRead(StoreError::Io(io)).is_cancelled());
    }

    #[test]
    fn test_error_messages_name_the_boundary() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = EngineError::StoreWrite(StoreError::Io(io));
        assert!(err.to_string().contains("written back"));

        let err = DispatchError::BadResponse {
            code: 503,
            message: "relay down".to_string(),
        };
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("relay down"));
    }
}
