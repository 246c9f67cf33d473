//! Local card/album catalog core.
//!
//! Persists cards, albums and attribute labels in a local SQLite-backed
//! record store, keeps album references consistent as records change, and
//! backs the whole catalog up to a single JSON document.

pub mod backup;
pub mod db;
pub mod error;
pub mod identity;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use backup::{
    export_all, export_json, import_all, import_json, parse_document, BackupDocument, BackupError,
    BackupResult, ImportSummary,
};
pub use error::ErrorKind;
pub use logging::{default_log_level, init_logging, logging_status, LogSettings, LoggingError};
pub use model::album::{Album, AlbumId, ALBUM_MAX_CARDS, ALBUM_MIN_CARDS};
pub use model::attribute::{Attribute, AttributeId};
pub use model::card::{Card, CardId};
pub use model::selection::{CardSelection, SelectionFull};
pub use model::{Collection, Record, RecordId, RecordValidationError};
pub use repo::{
    AlbumRepository, AttributeRepository, CardRepository, RepoError, RepoResult, Repository,
};
pub use service::catalog_service::{
    AlbumView, AttributeEdit, CardEdit, CascadeFailure, CascadeReport, CatalogService, NewCard,
};
pub use store::{RecordStore, SqliteRecordStore, StoreError, StoreResult};
