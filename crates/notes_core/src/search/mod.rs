//! Note search rules shared by every repository implementation.
//!
//! # Responsibility
//! - Decide whether a note matches a free-text search term.
//! - Build short result previews around the first match.
//!
//! # Invariants
//! - A term that trims to empty matches nothing.
//! - Matching is case-insensitive substring search over title, content and
//!   the associated category name, using Unicode lowercase folding.

mod preview;

pub use preview::{search_preview, PREVIEW_CONTEXT_CHARS, PREVIEW_MAX_CHARS};

use crate::model::note::Note;

/// Prepared, lowercase search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    needle: String,
}

impl SearchTerm {
    /// Prepares `text` for matching.
    ///
    /// Returns `None` when `text` is blank. The term itself keeps any inner or
    /// surrounding whitespace the caller typed.
    pub fn parse(text: &str) -> Option<Self> {
        if text.trim().is_empty() {
            return None;
        }
        Some(Self {
            needle: text.to_lowercase(),
        })
    }

    /// Lowercased needle used for matching.
    pub fn needle(&self) -> &str {
        &self.needle
    }

    /// Returns whether `haystack` contains this term, ignoring case.
    pub fn matches_text(&self, haystack: &str) -> bool {
        haystack.to_lowercase().contains(&self.needle)
    }

    /// Returns whether `note` (with its resolved category name) matches.
    pub fn matches_note(&self, note: &Note, category_name: Option<&str>) -> bool {
        self.matches_text(&note.title)
            || self.matches_text(&note.content)
            || category_name.is_some_and(|name| self.matches_text(name))
    }
}
