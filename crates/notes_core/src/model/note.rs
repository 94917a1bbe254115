//! Note record.
//!
//! The category link is a weak, optional foreign key: a note never owns its
//! category and stores only the id.

use super::category::{Category, CategoryId};
use super::{normalize_required, now_epoch_ms, touch_timestamp, ValidationError};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable note identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(pub Uuid);

impl NoteId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// User-authored text entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// Trimmed, never empty.
    pub title: String,
    /// Stored exactly as provided; may be empty.
    pub content: String,
    pub category_id: Option<CategoryId>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Note {
    /// Builds a new note with a fresh id and both timestamps set to now.
    ///
    /// # Errors
    /// - Returns `ValidationError` when `title` trims to empty.
    pub fn new(
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> Result<Self, ValidationError> {
        let title = normalize_required("title", title)?;
        let now = now_epoch_ms();
        Ok(Self {
            id: NoteId::new(),
            title,
            content: content.to_string(),
            category_id: category.map(|value| value.id),
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns a copy with title, content and category replaced together.
    pub fn edited(
        &self,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> Result<Self, ValidationError> {
        let title = normalize_required("title", title)?;
        Ok(Self {
            id: self.id,
            title,
            content: content.to_string(),
            category_id: category.map(|value| value.id),
            created_at: self.created_at,
            updated_at: touch_timestamp(self.updated_at),
        })
    }

    /// Returns whether this note belongs to `category`.
    pub fn belongs_to(&self, category: CategoryId) -> bool {
        self.category_id == Some(category)
    }
}

#[cfg(test)]
mod tests {
    use super::Note;
    use crate::model::category::Category;

    #[test]
    fn new_note_keeps_content_verbatim() {
        let note = Note::new(" Groceries ", "  Milk, eggs\n", None).expect("valid title");
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.content, "  Milk, eggs\n");
        assert_eq!(note.category_id, None);
    }

    #[test]
    fn edited_replaces_category_reference() {
        let travel = Category::new("Travel").expect("valid name");
        let note = Note::new("Trip", "", Some(&travel)).expect("valid title");
        assert!(note.belongs_to(travel.id));

        let moved = note.edited("Trip", "Paris", None).expect("valid title");
        assert_eq!(moved.id, note.id);
        assert_eq!(moved.category_id, None);
        assert_eq!(moved.content, "Paris");
        assert!(moved.created_at <= moved.updated_at);
    }

    #[test]
    fn edited_rejects_blank_title_without_touching_original() {
        let note = Note::new("Keep", "body", None).expect("valid title");
        let err = note.edited("   ", "other", None).expect_err("blank title");
        assert_eq!(err.field, "title");
        assert_eq!(note.title, "Keep");
    }
}
