//! Caller-facing error classification.
//!
//! Every layer keeps its own error enum; `kind()` on each of them collapses
//! the detail into one of these categories so callers can decide whether to
//! surface, retry or reject.

use std::fmt::{Display, Formatter};

/// Coarse error category shared by all catalog layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The store cannot be opened. Fatal to startup; never retried.
    StorageUnavailable,
    /// Input rejected before any write happened.
    Validation,
    /// Referenced record does not exist.
    NotFound,
    /// Underlying write failed; the caller may retry.
    Write,
    /// Underlying read failed or persisted data is undecodable.
    Read,
    /// Backup document does not have the expected shape.
    ImportFormat,
}

impl ErrorKind {
    /// Stable snake_case code used in log lines.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StorageUnavailable => "storage_unavailable",
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::Write => "write",
            Self::Read => "read",
            Self::ImportFormat => "import_format",
        }
    }

    /// Whether repeating the same call may succeed.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Write | Self::Read)
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
