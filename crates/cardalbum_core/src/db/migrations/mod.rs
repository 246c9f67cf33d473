//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register collection-creating migrations in strictly increasing order.
//! - Refuse a migration list that is out of order or drops schema objects.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Migrations are additive: they create collections, never drop them.
//! - Applied migration version is mirrored to `PRAGMA user_version`.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        sql: include_str!("0001_cards_albums.sql"),
    },
    Migration {
        version: 2,
        sql: include_str!("0002_attributes.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Statements a migration must not contain.
const FORBIDDEN_STATEMENTS: &[&str] = &["DROP ", "DELETE FROM", "RENAME "];

/// Checks versions start at 1, increase by one, and only add schema.
fn check_registry(migrations: &[Migration]) -> DbResult<()> {
    let mut expected = 1;
    for migration in migrations {
        if migration.version != expected {
            return Err(DbError::InvalidMigration {
                version: migration.version,
                reason: "versions must increase by one starting at 1",
            });
        }
        let sql = migration.sql.to_ascii_uppercase();
        if FORBIDDEN_STATEMENTS
            .iter()
            .any(|statement| sql.contains(statement))
        {
            return Err(DbError::InvalidMigration {
                version: migration.version,
                reason: "migrations may only add collections",
            });
        }
        expected += 1;
    }
    Ok(())
}

/// Applies all pending migrations on the provided connection.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    check_registry(MIGRATIONS)?;
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    if current_version == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version {
            continue;
        }

        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(())
}

/// Reads the schema version stored in `PRAGMA user_version`.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
