//! Album domain model.
//!
//! # Invariants
//! - `title` is non-blank.
//! - Writes require `ALBUM_MIN_CARDS <= card_ids.len() <= ALBUM_MAX_CARDS`.
//! - A card-deletion cascade may leave `card_ids` empty; such albums are
//!   still valid stored records.

use super::record::{ensure_id, Collection, Record, RecordId, RecordValidationError};
use crate::identity::{new_id, now_ms};
use crate::model::attribute::AttributeId;
use crate::model::card::CardId;
use serde::{Deserialize, Serialize};

pub type AlbumId = RecordId;

/// Fewest cards an album may be written with.
pub const ALBUM_MIN_CARDS: usize = 1;
/// Most cards an album may hold.
pub const ALBUM_MAX_CARDS: usize = 20;

/// An ordered group of cards with optional attribute labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    /// Display order; the first resolvable card is the cover.
    pub card_ids: Vec<CardId>,
    #[serde(default)]
    pub attribute_ids: Vec<AttributeId>,
    pub created_at: i64,
}

impl Album {
    pub fn new(
        title: impl Into<String>,
        card_ids: Vec<CardId>,
        attribute_ids: Vec<AttributeId>,
    ) -> Self {
        Self::with_id(new_id(), now_ms(), title, card_ids, attribute_ids)
    }

    pub fn with_id(
        id: AlbumId,
        created_at: i64,
        title: impl Into<String>,
        card_ids: Vec<CardId>,
        attribute_ids: Vec<AttributeId>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            card_ids,
            attribute_ids,
            created_at,
        }
    }

    pub fn contains_card(&self, card_id: CardId) -> bool {
        self.card_ids.contains(&card_id)
    }

    /// Drops every reference to `card_id`. Returns whether anything changed.
    pub fn remove_card(&mut self, card_id: CardId) -> bool {
        let before = self.card_ids.len();
        self.card_ids.retain(|id| *id != card_id);
        self.card_ids.len() != before
    }

    fn validate_common(&self, min_cards: usize) -> Result<(), RecordValidationError> {
        ensure_id(Self::COLLECTION, self.id)?;
        if self.title.trim().is_empty() {
            return Err(RecordValidationError::BlankTitle);
        }
        let count = self.card_ids.len();
        if count < min_cards || count > ALBUM_MAX_CARDS {
            return Err(RecordValidationError::CardCount {
                count,
                min: ALBUM_MIN_CARDS,
                max: ALBUM_MAX_CARDS,
            });
        }
        Ok(())
    }
}

impl Record for Album {
    const COLLECTION: Collection = Collection::Albums;

    fn id(&self) -> RecordId {
        self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn validate(&self) -> Result<(), RecordValidationError> {
        self.validate_common(ALBUM_MIN_CARDS)
    }

    fn validate_stored(&self) -> Result<(), RecordValidationError> {
        self.validate_common(0)
    }
}
