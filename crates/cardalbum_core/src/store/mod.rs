//! Collection-scoped key-value record store.
//!
//! # Responsibility
//! - Persist typed records as documents keyed by their id.
//! - Offer whole-collection read, point read, upsert and delete.
//!
//! # Invariants
//! - `put` is a full overwrite by id; repeating it is a no-op.
//! - `delete` of an absent id is not an error.
//! - The store enforces no business rule; repositories do.
//! - Persisted records that fail to decode are reported, never skipped.

mod sqlite;

use crate::db::DbError;
use crate::error::ErrorKind;
use crate::model::{Collection, Record, RecordId};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use sqlite::SqliteRecordStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Record store failure.
#[derive(Debug)]
pub enum StoreError {
    /// Engine could not be opened or bootstrapped.
    Unavailable(DbError),
    /// Connection schema is not at the version this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Collection table is missing from a migrated connection.
    MissingCollection(Collection),
    /// Reading from a collection failed.
    Read {
        collection: Collection,
        source: rusqlite::Error,
    },
    /// Writing to a collection failed.
    Write {
        collection: Collection,
        source: rusqlite::Error,
    },
    /// Record could not be serialized for storage.
    Encode {
        collection: Collection,
        id: RecordId,
        source: serde_json::Error,
    },
    /// Persisted document does not decode into a valid record.
    Corrupt {
        collection: Collection,
        id: String,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn read(collection: Collection, source: rusqlite::Error) -> Self {
        Self::Read { collection, source }
    }

    pub(crate) fn write(collection: Collection, source: rusqlite::Error) -> Self {
        Self::Write { collection, source }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unavailable(_) | Self::UninitializedConnection { .. } | Self::MissingCollection(_) => {
                ErrorKind::StorageUnavailable
            }
            Self::Read { .. } | Self::Corrupt { .. } => ErrorKind::Read,
            Self::Write { .. } | Self::Encode { .. } => ErrorKind::Write,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(err) => write!(f, "record store unavailable: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingCollection(collection) => {
                write!(f, "record store requires collection `{collection}`")
            }
            Self::Read { collection, source } => {
                write!(f, "failed to read `{collection}`: {source}")
            }
            Self::Write { collection, source } => {
                write!(f, "failed to write `{collection}`: {source}")
            }
            Self::Encode {
                collection,
                id,
                source,
            } => write!(f, "failed to encode {} {id}: {source}", collection.entity()),
            Self::Corrupt {
                collection,
                id,
                message,
            } => write!(
                f,
                "invalid persisted {} `{id}`: {message}",
                collection.entity()
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            Self::Read { source, .. } | Self::Write { source, .. } => Some(source),
            Self::Encode { source, .. } => Some(source),
            Self::UninitializedConnection { .. }
            | Self::MissingCollection(_)
            | Self::Corrupt { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Unavailable(value)
    }
}

/// Durable, collection-scoped record persistence.
pub trait RecordStore {
    /// Upserts one record by id.
    fn put<T: Record>(&self, record: &T) -> StoreResult<()>;
    /// Upserts a batch into one collection; all-or-nothing per batch.
    fn put_all<T: Record>(&self, records: &[T]) -> StoreResult<()>;
    /// Loads one record by id.
    fn get<T: Record>(&self, id: RecordId) -> StoreResult<Option<T>>;
    /// Loads every record of a collection. Order is not part of the contract.
    fn get_all<T: Record>(&self) -> StoreResult<Vec<T>>;
    /// Removes one record. Returns whether a record was present.
    fn delete(&self, collection: Collection, id: RecordId) -> StoreResult<bool>;
}
