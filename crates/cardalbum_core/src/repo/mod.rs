//! Typed repositories over the record store.
//!
//! # Responsibility
//! - Expose per-collection CRUD with domain types.
//! - Reject invalid records before they reach storage.
//!
//! # Invariants
//! - `upsert` calls `Record::validate()` and writes nothing on failure.
//! - Repositories hold no cross-collection rules; the catalog service does.

mod record_repo;

use crate::error::ErrorKind;
use crate::model::{Collection, RecordId, RecordValidationError};
use crate::store::StoreError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use record_repo::{AlbumRepository, AttributeRepository, CardRepository, Repository};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository and catalog service error.
#[derive(Debug)]
pub enum RepoError {
    /// Record failed validation; nothing was written.
    Validation(RecordValidationError),
    /// Record references an id that does not exist.
    DanglingReference { collection: Collection, id: RecordId },
    /// Target record does not exist.
    NotFound { collection: Collection, id: RecordId },
    /// Underlying store failure.
    Store(StoreError),
}

impl RepoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) | Self::DanglingReference { .. } => ErrorKind::Validation,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Store(err) => err.kind(),
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DanglingReference { collection, id } => {
                write!(f, "referenced {} does not exist: {id}", collection.entity())
            }
            Self::NotFound { collection, id } => {
                write!(f, "{} not found: {id}", collection.entity())
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            Self::DanglingReference { .. } | Self::NotFound { .. } => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}
