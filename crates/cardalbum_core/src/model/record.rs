//! Shared record contract for every stored collection.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Identifier shared by every collection.
pub type RecordId = Uuid;

/// Named collection inside the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Cards,
    Albums,
    Attributes,
}

impl Collection {
    /// Every collection, in backup document order.
    pub const ALL: [Collection; 3] = [Self::Cards, Self::Albums, Self::Attributes];

    /// Collection name, shared by the SQLite table and the backup key.
    pub fn name(self) -> &'static str {
        match self {
            Self::Cards => "cards",
            Self::Albums => "albums",
            Self::Attributes => "attributes",
        }
    }

    /// Singular noun used in error messages.
    pub fn entity(self) -> &'static str {
        match self {
            Self::Cards => "card",
            Self::Albums => "album",
            Self::Attributes => "attribute",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Validation failure for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValidationError {
    /// Record id is the nil UUID.
    NilId(Collection),
    /// Card or attribute name is blank after trim.
    BlankName(Collection),
    /// Album title is blank after trim.
    BlankTitle,
    /// Album card reference count is outside the allowed window.
    CardCount { count: usize, min: usize, max: usize },
}

impl Display for RecordValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId(collection) => write!(f, "{} id must not be nil", collection.entity()),
            Self::BlankName(collection) => {
                write!(f, "{} name must not be blank", collection.entity())
            }
            Self::BlankTitle => write!(f, "album title must not be blank"),
            Self::CardCount { count, min, max } => write!(
                f,
                "album must reference between {min} and {max} cards, got {count}"
            ),
        }
    }
}

impl Error for RecordValidationError {}

/// A typed entity stored in one named collection.
pub trait Record: Serialize + DeserializeOwned {
    /// Collection this record type lives in.
    const COLLECTION: Collection;

    fn id(&self) -> RecordId;

    /// Creation time in epoch milliseconds.
    fn created_at(&self) -> i64;

    /// Full rules applied before any repository write.
    fn validate(&self) -> Result<(), RecordValidationError>;

    /// Structural rules every persisted record satisfies.
    ///
    /// Looser than `validate` only where a cascade may legitimately leave a
    /// record outside the write rules.
    fn validate_stored(&self) -> Result<(), RecordValidationError> {
        self.validate()
    }
}

/// Removes repeated ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: impl IntoIterator<Item = RecordId>) -> Vec<RecordId> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

pub(crate) fn ensure_id(collection: Collection, id: RecordId) -> Result<(), RecordValidationError> {
    if id.is_nil() {
        return Err(RecordValidationError::NilId(collection));
    }
    Ok(())
}

pub(crate) fn ensure_name(collection: Collection, name: &str) -> Result<(), RecordValidationError> {
    if name.trim().is_empty() {
        return Err(RecordValidationError::BlankName(collection));
    }
    Ok(())
}
