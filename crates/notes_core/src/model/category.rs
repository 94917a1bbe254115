//! Category record.

use super::{normalize_required, now_epoch_ms, touch_timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable category identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub Uuid);

impl CategoryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CategoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for CategoryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named grouping for notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    /// Trimmed, never empty.
    pub name: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Category {
    /// Builds a new category with a fresh id and both timestamps set to now.
    ///
    /// # Errors
    /// - Returns `ValidationError` when `name` trims to empty.
    pub fn new(name: &str) -> Result<Self, ValidationError> {
        let name = normalize_required("name", name)?;
        let now = now_epoch_ms();
        Ok(Self {
            id: CategoryId::new(),
            name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns a copy renamed to trimmed `new_name` with a refreshed
    /// `updated_at`. `self` is left untouched.
    pub fn renamed(&self, new_name: &str) -> Result<Self, ValidationError> {
        let name = normalize_required("name", new_name)?;
        Ok(Self {
            id: self.id,
            name,
            created_at: self.created_at,
            updated_at: touch_timestamp(self.updated_at),
        })
    }
}
