//! Attribute label model.
//!
//! Attributes are a small reusable vocabulary. Deleting one never rewrites
//! the albums or cards that point at it; readers drop unresolved ids.

use super::record::{ensure_id, ensure_name, Collection, Record, RecordId, RecordValidationError};
use crate::identity::{new_id, now_ms};
use serde::{Deserialize, Serialize};

pub type AttributeId = RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    pub id: AttributeId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data_url: Option<String>,
    pub created_at: i64,
}

impl Attribute {
    pub fn new(name: impl Into<String>, image_data_url: Option<String>) -> Self {
        Self::with_id(new_id(), now_ms(), name, image_data_url)
    }

    pub fn with_id(
        id: AttributeId,
        created_at: i64,
        name: impl Into<String>,
        image_data_url: Option<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            image_data_url,
            created_at,
        }
    }
}

impl Record for Attribute {
    const COLLECTION: Collection = Collection::Attributes;

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
