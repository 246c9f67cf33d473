//! JSON interchange document codec.
//!
//! # Invariants
//! - A document is validated in full before the first write.
//! - Import merges by id; records absent from the document are untouched.
//! - Decoding normalizes absent optional fields: a card without
//!   `imageDataUrl` or `attributeIds` re-exports them as `""` and `[]`, an
//!   album without `attributeIds` re-exports `[]`. Re-export is therefore
//!   equal by value, not byte-for-byte.
//! - Album card ids are written as-is. Ids that resolve to no card after the
//!   import are counted in `ImportSummary::unresolved_card_ids`.

use super::{BackupError, BackupResult};
use crate::model::album::Album;
use crate::model::attribute::Attribute;
use crate::model::card::{Card, CardId};
use crate::model::Record;
use crate::store::{RecordStore, StoreResult};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Full catalog snapshot in interchange form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupDocument {
    #[serde(default)]
    pub cards: Vec<Card>,
    #[serde(default)]
    pub albums: Vec<Album>,
    #[serde(default)]
    pub attributes: Vec<Attribute>,
}

impl BackupDocument {
    /// Checks every record against stored-record rules.
    pub fn validate(&self) -> BackupResult<()> {
        validate_records(&self.cards)?;
        validate_records(&self.albums)?;
        validate_records(&self.attributes)
    }

    pub fn len(&self) -> usize {
        self.cards.len() + self.albums.len() + self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Record counts written by one import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub cards: usize,
    pub albums: usize,
    pub attributes: usize,
    /// Album card ids left pointing at no card once the import is written.
    pub unresolved_card_ids: usize,
}

/// Reads every collection into one document. Field values are not touched.
pub fn export_all<S: RecordStore>(store: &S) -> StoreResult<BackupDocument> {
    let document = BackupDocument {
        cards: store.get_all()?,
        albums: store.get_all()?,
        attributes: store.get_all()?,
    };
    info!(
        "event=backup_export module=backup status=ok cards={} albums={} attributes={}",
        document.cards.len(),
        document.albums.len(),
        document.attributes.len()
    );
    Ok(document)
}

/// Exports the catalog as pretty-printed JSON.
pub fn export_json<S: RecordStore>(store: &S) -> BackupResult<String> {
    let document = export_all(store)?;
    serde_json::to_string_pretty(&document).map_err(BackupError::Encode)
}

/// Decodes and fully validates a backup document.
///
/// Missing or `null` collections are empty. Unknown keys and fields are
/// ignored so older backups still load.
pub fn parse_document(text: &str) -> BackupResult<BackupDocument> {
    let value: Value = serde_json::from_str(text).map_err(BackupError::InvalidJson)?;
    let mut root = match value {
        Value::Object(root) => root,
        other => {
            return Err(BackupError::InvalidShape(format!(
                "top level must be an object, got {}",
                json_type(&other)
            )));
        }
    };

    let document = BackupDocument {
        cards: decode_collection(&mut root)?,
        albums: decode_collection(&mut root)?,
        attributes: decode_collection(&mut root)?,
    };
    document.validate()?;
    Ok(document)
}

/// Merges a document into the store.
///
/// Nothing is written when any record is invalid. Each collection is
/// written in its own transaction; collections are not atomic together.
pub fn import_all<S: RecordStore>(store: &S, document: &BackupDocument) -> BackupResult<ImportSummary> {
    if let Err(err) = document.validate() {
        error!("event=backup_import module=backup status=error error_code=invalid_document error={err}");
        return Err(err);
    }

    store.put_all(&document.cards)?;
    store.put_all(&document.attributes)?;
    store.put_all(&document.albums)?;

    let unresolved_card_ids = match count_unresolved_card_ids(store, &document.albums) {
        Ok(count) => count,
        Err(err) => {
            warn!("event=backup_import module=backup status=error error_code=reference_check_failed error={err}");
            0
        }
    };
    if unresolved_card_ids > 0 {
        warn!(
            "event=backup_import module=backup status=ok error_code=unresolved_card_ids count={unresolved_card_ids}"
        );
    }

    let summary = ImportSummary {
        cards: document.cards.len(),
        albums: document.albums.len(),
        attributes: document.attributes.len(),
        unresolved_card_ids,
    };
    info!(
        "event=backup_import module=backup status=ok cards={} albums={} attributes={}",
        summary.cards, summary.albums, summary.attributes
    );
    Ok(summary)
}

fn count_unresolved_card_ids<S: RecordStore>(store: &S, albums: &[Album]) -> StoreResult<usize> {
    if albums.is_empty() {
        return Ok(0);
    }
    let known: HashSet<CardId> = store
        .get_all::<Card>()?
        .into_iter()
        .map(|card| card.id)
        .collect();
    Ok(albums
        .iter()
        .flat_map(|album| album.card_ids.iter())
        .filter(|id| !known.contains(id))
        .count())
}

/// Parses and imports a JSON backup.
pub fn import_json<S: RecordStore>(store: &S, text: &str) -> BackupResult<ImportSummary> {
    let document = match parse_document(text) {
        Ok(document) => document,
        Err(err) => {
            error!("event=backup_import module=backup status=error error_code=invalid_document error={err}");
            return Err(err);
        }
    };
    import_all(store, &document)
}

fn decode_collection<T: Record>(root: &mut Map<String, Value>) -> BackupResult<Vec<T>> {
    let collection = T::COLLECTION;
    match root.remove(collection.name()) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| {
                serde_json::from_value(item).map_err(|err| BackupError::InvalidRecord {
                    collection,
                    index,
                    message: err.to_string(),
                })
            })
            .collect(),
        Some(other) => Err(BackupError::InvalidShape(format!(
            "`{collection}` must be an array, got {}",
            json_type(&other)
        ))),
    }
}

fn validate_records<T: Record>(records: &[T]) -> BackupResult<()> {
    for (index, record) in records.iter().enumerate() {
        record
            .validate_stored()
            .map_err(|err| BackupError::InvalidRecord {
                collection: T::COLLECTION,
                index,
                message: err.to_string(),
            })?;
    }
    Ok(())
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
