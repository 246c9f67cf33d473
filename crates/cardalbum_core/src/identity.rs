//! Record identity and creation timestamps.
//!
//! # Invariants
//! - Ids are random v4 UUIDs and never nil.
//! - `now_ms` never goes backwards within one process, even if the wall
//!   clock does.

use crate::model::RecordId;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

static LAST_ISSUED_MS: AtomicI64 = AtomicI64::new(0);

/// Generates a fresh record id.
pub fn new_id() -> RecordId {
    Uuid::new_v4()
}

/// Returns Unix epoch milliseconds, clamped to be non-decreasing.
///
/// Used for display ordering only, never for conflict resolution.
pub fn now_ms() -> i64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0);
    let previous = LAST_ISSUED_MS.fetch_max(wall, Ordering::Relaxed);
    previous.max(wall)
}
