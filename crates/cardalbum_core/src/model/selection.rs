//! In-progress card selection used while composing an album.
//!
//! This is session state owned by the caller and passed explicitly into the
//! catalog service; it is never persisted.

use crate::model::album::ALBUM_MAX_CARDS;
use crate::model::card::CardId;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Selection already holds the maximum number of cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionFull {
    pub max: usize,
}

impl Display for SelectionFull {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "an album holds at most {} cards", self.max)
    }
}

impl Error for SelectionFull {}

/// Ordered, duplicate-free set of picked cards, capped at album capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardSelection {
    card_ids: Vec<CardId>,
}

impl CardSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips membership of `card_id`.
    ///
    /// Returns `Ok(true)` when the card is now selected and `Ok(false)` when
    /// it was deselected. Adding beyond capacity fails and leaves the
    /// selection unchanged.
    pub fn toggle(&mut self, card_id: CardId) -> Result<bool, SelectionFull> {
        if let Some(index) = self.card_ids.iter().position(|id| *id == card_id) {
            self.card_ids.remove(index);
            return Ok(false);
        }
        if self.card_ids.len() >= ALBUM_MAX_CARDS {
            return Err(SelectionFull {
                max: ALBUM_MAX_CARDS,
            });
        }
        self.card_ids.push(card_id);
        Ok(true)
    }

    pub fn contains(&self, card_id: CardId) -> bool {
        self.card_ids.contains(&card_id)
    }

    pub fn len(&self) -> usize {
        self.card_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.card_ids.is_empty()
    }

    /// Slots left before the selection is full.
    pub fn remaining(&self) -> usize {
        ALBUM_MAX_CARDS - self.card_ids.len()
    }

    /// Picked ids in selection order.
    pub fn card_ids(&self) -> &[CardId] {
        &self.card_ids
    }

    pub fn clear(&mut self) {
        self.card_ids.clear();
    }
}
