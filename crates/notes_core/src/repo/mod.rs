//! Repository contract for categories and notes.
//!
//! # Responsibility
//! - Define the single data-access contract used by every caller.
//! - Own the error taxonomy surfaced to callers.
//! - Provide SQLite-backed and in-memory implementations with identical
//!   behavior.
//!
//! # Invariants
//! - No note ever references a deleted category: category deletion removes
//!   dependent notes first, as one unit.
//! - Names and titles are trimmed and must be non-empty before persistence.
//! - A failed mutation leaves stored data unchanged; there is no retry.

pub mod memory_repo;
pub mod sqlite_repo;

use crate::config::RepositoryConfig;
use crate::model::category::Category;
use crate::model::note::Note;
use crate::model::ValidationError;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type RepoResult<T> = Result<T, RepoError>;

/// Failure kinds surfaced by repository operations.
///
/// Each variant carries a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// A required field was empty after trimming.
    InvalidData(String),
    /// A referenced entity no longer exists.
    NotFound(String),
    /// The storage write failed.
    SaveFailed(String),
    /// The storage delete failed.
    DeleteFailed(String),
    /// Unclassified storage failure (reads, bootstrap, corrupt rows).
    Unknown(String),
}

impl RepoError {
    /// Stable machine-readable code used in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidData(_) => "invalid_data",
            Self::NotFound(_) => "not_found",
            Self::SaveFailed(_) => "save_failed",
            Self::DeleteFailed(_) => "delete_failed",
            Self::Unknown(_) => "unknown",
        }
    }

    pub(crate) fn save(err: impl Display) -> Self {
        Self::SaveFailed(err.to_string())
    }

    pub(crate) fn delete(err: impl Display) -> Self {
        Self::DeleteFailed(err.to_string())
    }

    pub(crate) fn unknown(err: impl Display) -> Self {
        Self::Unknown(err.to_string())
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidData(message) => write!(f, "invalid data: {message}"),
            Self::NotFound(message) => write!(f, "not found: {message}"),
            Self::SaveFailed(message) => write!(f, "save failed: {message}"),
            Self::DeleteFailed(message) => write!(f, "delete failed: {message}"),
            Self::Unknown(message) => write!(f, "unknown storage error: {message}"),
        }
    }
}

impl Error for RepoError {}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Counts returned by `delete_all_data`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteAllSummary {
    pub categories_deleted: usize,
    pub notes_deleted: usize,
}

/// Data-access contract for categories and notes.
///
/// Reads take `&self`; mutations take `&mut self` so one handle never has two
/// mutations in flight. Every mutation is persisted before it returns.
pub trait NotesRepository {
    /// All categories, newest `created_at` first.
    fn fetch_categories(&self) -> RepoResult<Vec<Category>>;
    /// Persists a new category named trimmed `name`.
    fn create_category(&mut self, name: &str) -> RepoResult<Category>;
    /// Renames `category` to trimmed `new_name` and returns the stored value.
    fn update_category(&mut self, category: &Category, new_name: &str) -> RepoResult<Category>;
    /// Deletes `category` and every note referencing it. Returns the number of
    /// cascaded notes.
    fn delete_category(&mut self, category: &Category) -> RepoResult<usize>;
    /// Cascade-deletes every category. Returns the number of categories.
    fn delete_all_categories(&mut self) -> RepoResult<usize>;

    /// All notes, newest `updated_at` first.
    fn fetch_notes(&self) -> RepoResult<Vec<Note>>;
    /// Persists a new note with trimmed `title` and verbatim `content`.
    fn create_note(
        &mut self,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> RepoResult<Note>;
    /// Replaces title, content and category of `note` together.
    fn update_note(
        &mut self,
        note: &Note,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> RepoResult<Note>;
    fn delete_note(&mut self, note: &Note) -> RepoResult<()>;
    /// Deletes every note. Returns how many were removed.
    fn delete_all_notes(&mut self) -> RepoResult<usize>;
    /// Deletes every note, then every category.
    fn delete_all_data(&mut self) -> RepoResult<DeleteAllSummary>;

    /// Notes whose title, content or category name contains `text`, ignoring
    /// case. Blank `text` yields an empty result.
    fn search_notes(&self, text: &str) -> RepoResult<Vec<Note>>;
    /// Notes referencing `category`, newest `updated_at` first.
    fn fetch_notes_for_category(&self, category: &Category) -> RepoResult<Vec<Note>>;
}

impl<R: NotesRepository + ?Sized> NotesRepository for &mut R {
    fn fetch_categories(&self) -> RepoResult<Vec<Category>> {
        (**self).fetch_categories()
    }

    fn create_category(&mut self, name: &str) -> RepoResult<Category> {
        (**self).create_category(name)
    }

    fn update_category(&mut self, category: &Category, new_name: &str) -> RepoResult<Category> {
        (**self).update_category(category, new_name)
    }

    fn delete_category(&mut self, category: &Category) -> RepoResult<usize> {
        (**self).delete_category(category)
    }

    fn delete_all_categories(&mut self) -> RepoResult<usize> {
        (**self).delete_all_categories()
    }

    fn fetch_notes(&self) -> RepoResult<Vec<Note>> {
        (**self).fetch_notes()
    }

    fn create_note(
        &mut self,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> RepoResult<Note> {
        (**self).create_note(title, content, category)
    }

    fn update_note(
        &mut self,
        note: &Note,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> RepoResult<Note> {
        (**self).update_note(note, title, content, category)
    }

    fn delete_note(&mut self, note: &Note) -> RepoResult<()> {
        (**self).delete_note(note)
    }

    fn delete_all_notes(&mut self) -> RepoResult<usize> {
        (**self).delete_all_notes()
    }

    fn delete_all_data(&mut self) -> RepoResult<DeleteAllSummary> {
        (**self).delete_all_data()
    }

    fn search_notes(&self, text: &str) -> RepoResult<Vec<Note>> {
        (**self).search_notes(text)
    }

    fn fetch_notes_for_category(&self, category: &Category) -> RepoResult<Vec<Note>> {
        (**self).fetch_notes_for_category(category)
    }
}

/// Per-operation diagnostic event, gated by `RepositoryConfig::enable_logging`.
///
/// Emits `event=<name> module=repo backend=<backend> status=ok|slow|error`.
/// Only ids and counts are logged, never titles or content.
pub(crate) struct OperationLog {
    event: &'static str,
    backend: &'static str,
    config: RepositoryConfig,
    started_at: Instant,
}

impl OperationLog {
    pub(crate) fn start(
        config: &RepositoryConfig,
        backend: &'static str,
        event: &'static str,
    ) -> Self {
        Self {
            event,
            backend,
            config: *config,
            started_at: Instant::now(),
        }
    }

    /// Logs `result` and hands it back unchanged.
    pub(crate) fn finish<T>(
        self,
        result: RepoResult<T>,
        fields: impl FnOnce(&T) -> String,
    ) -> RepoResult<T> {
        if !self.config.enable_logging {
            return result;
        }

        let elapsed = self.started_at.elapsed();
        match &result {
            Ok(value) if self.config.is_slow(elapsed) => warn!(
                "event={} module=repo backend={} status=slow duration_ms={} timeout_ms={} {}",
                self.event,
                self.backend,
                elapsed.as_millis(),
                self.config.operation_timeout.as_millis(),
                fields(value)
            ),
            Ok(value) => info!(
                "event={} module=repo backend={} status=ok duration_ms={} {}",
                self.event,
                self.backend,
                elapsed.as_millis(),
                fields(value)
            ),
            Err(err) => error!(
                "event={} module=repo backend={} status=error duration_ms={} error_code={} error={}",
                self.event,
                self.backend,
                elapsed.as_millis(),
                err.code(),
                err
            ),
        }
        result
    }
}

/// Sorts newest first by `key`; ties keep the most recently inserted first.
///
/// `items` must be in insertion order.
pub(crate) fn newest_first<T: Clone>(items: &[T], key: impl Fn(&T) -> i64) -> Vec<T> {
    let mut sorted: Vec<T> = items.iter().rev().cloned().collect();
    sorted.sort_by(|a, b| key(b).cmp(&key(a)));
    sorted
}
