//! Catalog domain model: cards, albums and attribute labels.
//!
//! # Responsibility
//! - Define the typed entities moved through the record store.
//! - Own per-record validation rules.
//!
//! # Invariants
//! - Every record is identified by a non-nil `RecordId`.
//! - Relationships are reference-by-id only; no entity owns another.

pub mod album;
pub mod attribute;
pub mod card;
mod record;
pub mod selection;

pub use record::{dedup_ids, Collection, Record, RecordId, RecordValidationError};
