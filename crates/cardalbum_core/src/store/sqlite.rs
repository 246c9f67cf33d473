//! SQLite-backed record store: one table per collection, JSON bodies.

use super::{RecordStore, StoreError, StoreResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::model::{Collection, Record, RecordId};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

/// Record store over a migrated SQLite connection.
#[derive(Clone, Copy)]
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations were not applied.
    /// - `MissingCollection` when a collection table is absent.
    pub fn try_new(conn: &'conn Connection) -> StoreResult<Self> {
        ensure_store_ready(conn)?;
        Ok(Self { conn })
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn put<T: Record>(&self, record: &T) -> StoreResult<()> {
        let collection = T::COLLECTION;
        let body = encode_record(record)?;
        upsert_row(self.conn, collection, record, &body)
            .map_err(|source| StoreError::write(collection, source))?;
        debug!(
            "event=store_put module=store status=ok collection={collection} id={}",
            record.id()
        );
        Ok(())
    }

    fn put_all<T: Record>(&self, records: &[T]) -> StoreResult<()> {
        let collection = T::COLLECTION;
        let encoded = records
            .iter()
            .map(|record| encode_record(record).map(|body| (record, body)))
            .collect::<StoreResult<Vec<_>>>()?;

        let tx = self
            .conn
            .unchecked_transaction()
            .map_err(|source| StoreError::write(collection, source))?;
        for (record, body) in &encoded {
            upsert_row(&tx, collection, *record, body)
                .map_err(|source| StoreError::write(collection, source))?;
        }
        tx.commit()
            .map_err(|source| StoreError::write(collection, source))?;

        debug!(
            "event=store_put_all module=store status=ok collection={collection} count={}",
            encoded.len()
        );
        Ok(())
    }

    fn get<T: Record>(&self, id: RecordId) -> StoreResult<Option<T>> {
        let collection = T::COLLECTION;
        let id_text = id.to_string();
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {} WHERE id = ?1;", collection.name()),
                [id_text.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|source| StoreError::read(collection, source))?;

        body.map(|body| decode_record(&id_text, &body)).transpose()
    }

    fn get_all<T: Record>(&self) -> StoreResult<Vec<T>> {
        let collection = T::COLLECTION;
        let read = |source| StoreError::read(collection, source);
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT id, body FROM {} ORDER BY created_at DESC, id ASC;",
                collection.name()
            ))
            .map_err(read)?;

        let mut rows = stmt.query([]).map_err(read)?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(read)? {
            let id: String = row.get(0).map_err(read)?;
            let body: String = row.get(1).map_err(read)?;
            records.push(decode_record(&id, &body)?);
        }

        debug!(
            "event=store_get_all module=store status=ok collection={collection} count={}",
            records.len()
        );
        Ok(records)
    }

    fn delete(&self, collection: Collection, id: RecordId) -> StoreResult<bool> {
        let changed = self
            .conn
            .execute(
                &format!("DELETE FROM {} WHERE id = ?1;", collection.name()),
                [id.to_string()],
            )
            .map_err(|source| StoreError::write(collection, source))?;
        debug!(
            "event=store_delete module=store status=ok collection={collection} id={id} removed={}",
            changed > 0
        );
        Ok(changed > 0)
    }
}

fn upsert_row<T: Record>(
    conn: &Connection,
    collection: Collection,
    record: &T,
    body: &str,
) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO {} (id, created_at, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                created_at = excluded.created_at,
                body = excluded.body;",
            collection.name()
        ),
        params![record.id().to_string(), record.created_at(), body],
    )
}

fn encode_record<T: Record>(record: &T) -> StoreResult<String> {
    serde_json::to_string(record).map_err(|source| StoreError::Encode {
        collection: T::COLLECTION,
        id: record.id(),
        source,
    })
}

fn decode_record<T: Record>(key: &str, body: &str) -> StoreResult<T> {
    let corrupt = |message: String| StoreError::Corrupt {
        collection: T::COLLECTION,
        id: key.to_string(),
        message,
    };

    let record: T = serde_json::from_str(body).map_err(|err| corrupt(err.to_string()))?;
    if record.id().to_string() != key {
        return Err(corrupt(format!(
            "body id {} does not match row key",
            record.id()
        )));
    }
    record
        .validate_stored()
        .map_err(|err| corrupt(err.to_string()))?;
    Ok(record)
}

fn ensure_store_ready(conn: &Connection) -> StoreResult<()> {
    let actual_version = current_user_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for collection in Collection::ALL {
        let exists: i64 = conn
            .query_row(
                "SELECT EXISTS(
                    SELECT 1
                    FROM sqlite_master
                    WHERE type = 'table' AND name = ?1
                );",
                [collection.name()],
                |row| row.get(0),
            )
            .map_err(|source| StoreError::read(collection, source))?;
        if exists != 1 {
            return Err(StoreError::MissingCollection(collection));
        }
    }

    Ok(())
}
