//! Domain model for categories and notes.
//!
//! # Responsibility
//! - Define the plain value records persisted by repositories.
//! - Own the trim/non-empty rule shared by every write path.
//!
//! # Invariants
//! - Entities are values: changes are applied by returning a new value to a
//!   repository, never through shared mutable handles.
//! - `created_at <= updated_at` for every entity.
//! - Timestamps are Unix epoch milliseconds.

pub mod category;
pub mod note;

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Validation failure for user-editable text fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Field that failed validation (`name`, `title`).
    pub field: &'static str,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} cannot be empty", self.field)
    }
}

impl Error for ValidationError {}

/// Trims `value` and rejects empty results.
///
/// Whitespace is Unicode whitespace, newlines included.
pub fn normalize_required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError { field });
    }
    Ok(trimmed.to_string())
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

/// Timestamp for a mutation of an entity last stamped at `previous`.
///
/// Never moves backwards, so `created_at <= updated_at` survives clock skew.
pub(crate) fn touch_timestamp(previous: i64) -> i64 {
    now_epoch_ms().max(previous)
}
