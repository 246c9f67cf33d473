//! Whole-catalog backup and restore.
//!
//! # Responsibility
//! - Export every collection into one JSON interchange document.
//! - Restore a document into the store with merge-by-id semantics.
//!
//! # Invariants
//! - Import validates the whole document before the first write.
//! - Import never deletes: records absent from the document are untouched,
//!   records sharing an id with an imported one are fully overwritten.
//! - Export then import into an empty store reproduces every record exactly.

mod codec;

use crate::error::ErrorKind;
use crate::model::Collection;
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use codec::{
    export_all, export_json, import_all, import_json, parse_document, BackupDocument,
    ImportSummary,
};

pub type BackupResult<T> = Result<T, BackupError>;

#[derive(Debug)]
pub enum BackupError {
    /// Input is not JSON at all.
    InvalidJson(serde_json::Error),
    /// Document or one of its collections has the wrong JSON type.
    InvalidShape(String),
    /// One element does not decode or fails record validation.
    InvalidRecord {
        collection: Collection,
        index: usize,
        message: String,
    },
    /// Export document could not be serialized.
    Encode(serde_json::Error),
    Store(StoreError),
}

impl BackupError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidJson(_) | Self::InvalidShape(_) | Self::InvalidRecord { .. } => {
                ErrorKind::ImportFormat
            }
            Self::Encode(_) => ErrorKind::Write,
            Self::Store(err) => err.kind(),
        }
    }
}

impl Display for BackupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidJson(err) => write!(f, "backup is not valid JSON: {err}"),
            Self::InvalidShape(message) => write!(f, "invalid backup document: {message}"),
            Self::InvalidRecord {
                collection,
                index,
                message,
            } => write!(f, "invalid backup record `{collection}[{index}]`: {message}"),
            Self::Encode(err) => write!(f, "failed to encode backup: {err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackupError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidJson(err) | Self::Encode(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::InvalidShape(_) | Self::InvalidRecord { .. } => None,
        }
    }
}

impl From<StoreError> for BackupError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
