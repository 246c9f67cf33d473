//! Card domain model.
//!
//! # Invariants
//! - `name` is non-blank.
//! - `image_data_url` is opaque; it may be empty.

use super::record::{ensure_id, ensure_name, Collection, Record, RecordId, RecordValidationError};
use crate::identity::{new_id, now_ms};
use crate::model::attribute::AttributeId;
use serde::{Deserialize, Serialize};

pub type CardId = RecordId;

/// An image-backed catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: CardId,
    pub name: String,
    /// Encoded image produced outside the core.
    #[serde(default)]
    pub image_data_url: String,
    /// Attribute labels attached to this card. Weak references.
    #[serde(default)]
    pub attribute_ids: Vec<AttributeId>,
    pub created_at: i64,
}

impl Card {
    /// Creates a card with a generated id and the current timestamp.
    pub fn new(name: impl Into<String>, image_data_url: impl Into<String>) -> Self {
        Self::with_id(new_id(), now_ms(), name, image_data_url)
    }

    /// Creates a card with caller-provided identity, e.g. from a backup.
    pub fn with_id(
        id: CardId,
        created_at: i64,
        name: impl Into<String>,
        image_data_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image_data_url: image_data_url.into(),
            attribute_ids: Vec::new(),
            created_at,
        }
    }

    /// Returns the image when one was stored.
    pub fn image(&self) -> Option<&str> {
        if self.image_data_url.is_empty() {
            None
        } else {
            Some(self.image_data_url.as_str())
        }
    }
}

impl Record for Card {
    const COLLECTION: Collection = Collection::Cards;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        ensure_id(Self::COLLECTION, self.id)?;
        ensure_name(Self::COLLECTION, &self.name)
    }
}
