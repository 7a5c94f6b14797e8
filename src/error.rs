//! Error types for ranged transfers.

use crate::plan::Part;
use std::io;
use thiserror::Error;

pub type Result<T, E = TransferError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TransferError {
    /// The size probe failed: missing object, access denied or transport failure.
    #[error("failed to read object metadata: {}", format_remote(.code, .message))]
    RemoteMetadata {
        code: Option<String>,
        message: String,
    },

    #[error("failed to fetch {part}: {message}")]
    RangeFetch { part: Part, message: String },

    #[error("short read on {part}: expected {expected} bytes, got {actual}")]
    ShortRead {
        part: Part,
        expected: u64,
        actual: u64,
    },

    #[error("failed to write {part}: {source}")]
    Write {
        part: Part,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("transfer cancelled")]
    Cancelled,

    #[error("worker task failed: {0}")]
    Worker(String),
}

impl TransferError {
    /// Whether a [`RetryingFetcher`](crate::store::retry::RetryingFetcher) may try again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RangeFetch { .. } | Self::ShortRead { .. })
    }

    /// The part this error belongs to, if any.
    pub fn part(&self) -> Option<Part> {
        match self {
            Self::RangeFetch { part, .. }
            | Self::ShortRead { part, .. }
            | Self::Write { part, .. } => Some(*part),
            _ => None,
        }
    }
}

fn format_remote(code: &Option<String>, message: &str) -> String {
    match code {
        Some(code) => format!("{code}: {message}"),
        None => message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_metadata_message_includes_code() {
        let err = TransferError::RemoteMetadata {
            code: Some("NoSuchKey".into()),
            message: "The specified key does not exist.".into(),
        };
        assert_eq!(
            err.to_string(),
            "failed to read object metadata: NoSuchKey: The specified key does not exist."
        );

        let err = TransferError::RemoteMetadata {
            code: None,
            message: "dispatch failure".into(),
        };
        assert_eq!(err.to_string(), "failed to read object metadata: dispatch failure");
    }

    #[test]
    fn only_fetch_side_errors_are_retryable() {
        let part = Part { index: 2, start: 20, len: 10 };
        assert!(
            TransferError::RangeFetch { part, message: "reset".into() }.is_retryable()
        );
        assert!(
            TransferError::ShortRead { part, expected: 10, actual: 3 }.is_retryable()
        );
        assert!(
            !TransferError::Write { part, source: io::Error::other("disk full") }.is_retryable()
        );
        assert!(!TransferError::Cancelled.is_retryable());
    }

    #[test]
    fn short_read_reports_part() {
        let part = Part { index: 1, start: 5, len: 5 };
        let err = TransferError::ShortRead { part, expected: 5, actual: 4 };
        assert_eq!(err.part(), Some(part));
        assert_eq!(
            err.to_string(),
            "short read on part 1 [5, 10): expected 5 bytes, got 4"
        );
    }
}
