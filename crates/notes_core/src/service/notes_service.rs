//! Caller-side notes service.
//!
//! # Responsibility
//! - Run repository calls through a `LoadingTracker` so UI hosts get one
//!   loading/error state per operation kind.
//! - Turn repository failures into a logged, generic `None` result.
//! - Derive library statistics and search suggestions.
//!
//! # Invariants
//! - The service never retries; on failure the caller re-fetches.
//! - Data returned by the service always comes from a fresh repository read.

use crate::model::category::Category;
use crate::model::note::Note;
use crate::repo::{DeleteAllSummary, NotesRepository, RepoResult};
use crate::service::loading::{LoadingTracker, OperationKind};
use std::collections::HashSet;
use std::time::Instant;

/// Categories whose names seed search suggestions.
const SUGGESTION_CATEGORY_COUNT: usize = 3;
/// Most recent notes whose first title word seeds search suggestions.
const SUGGESTION_NOTE_COUNT: usize = 5;
/// Default number of suggestions shown.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 3;

/// Aggregate counts for a settings/overview screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub categories: usize,
    pub notes: usize,
    /// Notes that reference a category (removed by a category delete-all).
    pub categorized_notes: usize,
}

impl LibraryStats {
    pub fn has_any_data(&self) -> bool {
        self.categories > 0 || self.notes > 0
    }
}

/// Notes service facade over a repository implementation.
pub struct NotesService<R: NotesRepository> {
    repo: R,
    loading: LoadingTracker,
}

impl<R: NotesRepository> NotesService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            loading: LoadingTracker::new(),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn repo_mut(&mut self) -> &mut R {
        &mut self.repo
    }

    pub fn into_repo(self) -> R {
        self.repo
    }

    /// Read-only view of the per-operation loading states.
    pub fn loading(&self) -> &LoadingTracker {
        &self.loading
    }

    /// Expires settled loading states; hosts call this from their frame tick.
    pub fn tick(&mut self, now: Instant) {
        self.loading.clear_expired(now);
    }

    pub fn fetch_categories(&mut self) -> Option<Vec<Category>> {
        let repo = &self.repo;
        self.loading
            .perform(OperationKind::Fetch, || repo.fetch_categories())
    }

    pub fn fetch_notes(&mut self) -> Option<Vec<Note>> {
        let repo = &self.repo;
        self.loading
            .perform(OperationKind::Fetch, || repo.fetch_notes())
    }

    pub fn fetch_notes_for_category(&mut self, category: &Category) -> Option<Vec<Note>> {
        let repo = &self.repo;
        self.loading.perform(OperationKind::Fetch, || {
            repo.fetch_notes_for_category(category)
        })
    }

    pub fn create_category(&mut self, name: &str) -> Option<Category> {
        let repo = &mut self.repo;
        self.loading
            .perform(OperationKind::Create, || repo.create_category(name))
    }

    pub fn rename_category(&mut self, category: &Category, new_name: &str) -> Option<Category> {
        let repo = &mut self.repo;
        self.loading.perform(OperationKind::Update, || {
            repo.update_category(category, new_name)
        })
    }

    /// Deletes `category` and its notes; returns how many notes went with it.
    pub fn delete_category(&mut self, category: &Category) -> Option<usize> {
        let repo = &mut self.repo;
        self.loading
            .perform(OperationKind::Delete, || repo.delete_category(category))
    }

    pub fn create_note(
        &mut self,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> Option<Note> {
        let repo = &mut self.repo;
        self.loading.perform(OperationKind::Create, || {
            repo.create_note(title, content, category)
        })
    }

    pub fn update_note(
        &mut self,
        note: &Note,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> Option<Note> {
        let repo = &mut self.repo;
        self.loading.perform(OperationKind::Update, || {
            repo.update_note(note, title, content, category)
        })
    }

    /// Returns `true` when the note was removed.
    pub fn delete_note(&mut self, note: &Note) -> bool {
        let repo = &mut self.repo;
        self.loading
            .perform(OperationKind::Delete, || repo.delete_note(note))
            .is_some()
    }

    pub fn search_notes(&mut self, text: &str) -> Option<Vec<Note>> {
        let repo = &self.repo;
        self.loading
            .perform(OperationKind::Search, || repo.search_notes(text))
    }

    pub fn delete_all_categories(&mut self) -> Option<usize> {
        let repo = &mut self.repo;
        self.loading
            .perform(OperationKind::DeleteAll, || repo.delete_all_categories())
    }

    pub fn delete_all_notes(&mut self) -> Option<usize> {
        let repo = &mut self.repo;
        self.loading
            .perform(OperationKind::DeleteAll, || repo.delete_all_notes())
    }

    pub fn delete_all_data(&mut self) -> Option<DeleteAllSummary> {
        let repo = &mut self.repo;
        self.loading
            .perform(OperationKind::DeleteAll, || repo.delete_all_data())
    }

    /// Counts categories, notes and categorized notes from one fresh read.
    pub fn library_stats(&mut self) -> Option<LibraryStats> {
        let repo = &self.repo;
        self.loading.perform(OperationKind::Fetch, || {
            let categories = repo.fetch_categories()?;
            let notes = repo.fetch_notes()?;
            Ok::<_, crate::repo::RepoError>(LibraryStats {
                categories: categories.len(),
                notes: notes.len(),
                categorized_notes: notes
                    .iter()
                    .filter(|note| note.category_id.is_some())
                    .count(),
            })
        })
    }

    /// Suggested search terms: the newest category names, then the first word
    /// of the most recently updated note titles, de-duplicated in order.
    pub fn search_suggestions(&mut self, limit: usize) -> Option<Vec<String>> {
        let repo = &self.repo;
        self.loading.perform(OperationKind::Fetch, || {
            suggestions_from(repo.fetch_categories()?, repo.fetch_notes()?, limit)
        })
    }
}

fn suggestions_from(
    categories: Vec<Category>,
    notes: Vec<Note>,
    limit: usize,
) -> RepoResult<Vec<String>> {
    let category_names = categories
        .into_iter()
        .take(SUGGESTION_CATEGORY_COUNT)
        .map(|category| category.name);
    let title_words = notes
        .iter()
        .take(SUGGESTION_NOTE_COUNT)
        .filter_map(|note| note.title.split_whitespace().next().map(str::to_string));

    let mut seen = HashSet::new();
    Ok(category_names
        .chain(title_words)
        .filter(|candidate| seen.insert(candidate.clone()))
        .take(limit)
        .collect())
}
