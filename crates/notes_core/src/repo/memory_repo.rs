//! In-memory `NotesRepository` test double.
//!
//! # Responsibility
//! - Mirror `SqliteNotesRepository` behavior without storage, for caller tests.
//! - Allow fixture seeding and simulated storage failures.
//!
//! # Invariants
//! - Vectors are kept in insertion order; updates replace in place.
//! - Validation and not-found checks run before simulated failures, matching
//!   the order the SQLite implementation reports them.
//! - Updates start from the stored value; the caller's copy only names the
//!   entity.
//! - Fixtures must already be in the shape the SQLite store accepts.

use crate::config::RepositoryConfig;
use crate::model::category::{Category, CategoryId};
use crate::model::note::{Note, NoteId};
use crate::model::{normalize_required, now_epoch_ms};
use crate::repo::{
    newest_first, DeleteAllSummary, NotesRepository, OperationLog, RepoError, RepoResult,
};
use crate::search::SearchTerm;
use std::collections::HashSet;

const BACKEND: &str = "memory";
const SIMULATED_FAILURE: &str = "simulated storage failure";

/// Vector-backed repository with identical contract to the SQLite one.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotesRepository {
    config: RepositoryConfig,
    categories: Vec<Category>,
    notes: Vec<Note>,
    fail_writes: bool,
}

impl InMemoryNotesRepository {
    pub fn new(config: RepositoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Builds a repository pre-seeded with `categories` and `notes`, kept in
    /// the given order as their insertion order.
    ///
    /// # Errors
    /// - `RepoError::InvalidData` on duplicate ids, blank or untrimmed
    ///   names/titles, `created_at > updated_at`, or a note that references a
    ///   category missing from `categories`.
    pub fn with_fixtures(
        config: RepositoryConfig,
        categories: Vec<Category>,
        notes: Vec<Note>,
    ) -> RepoResult<Self> {
        let mut category_ids = HashSet::new();
        for category in &categories {
            check_fixture_text(&category.name, "category", "name", category.id)?;
            check_fixture_timestamps(
                category.created_at,
                category.updated_at,
                "category",
                category.id,
            )?;
            if !category_ids.insert(category.id) {
                return Err(RepoError::InvalidData(format!(
                    "duplicate fixture category {}",
                    category.id
                )));
            }
        }

        let mut note_ids = HashSet::new();
        for note in &notes {
            check_fixture_text(&note.title, "note", "title", note.id)?;
            check_fixture_timestamps(note.created_at, note.updated_at, "note", note.id)?;
            if !note_ids.insert(note.id) {
                return Err(RepoError::InvalidData(format!(
                    "duplicate fixture note {}",
                    note.id
                )));
            }
            if let Some(category_id) = note.category_id {
                if !category_ids.contains(&category_id) {
                    return Err(RepoError::InvalidData(format!(
                        "fixture note {} references unknown category {category_id}",
                        note.id
                    )));
                }
            }
        }

        Ok(Self {
            config,
            categories,
            notes,
            fail_writes: false,
        })
    }

    /// Replaces all data with a small sample set: categories `Work` and
    /// `Personal`, one note in each, and one uncategorized note.
    pub fn seed_sample_data(&mut self) {
        let work = sample_category("Work");
        let personal = sample_category("Personal");
        self.notes = vec![
            sample_note("Note 1", "Content 1", Some(&work)),
            sample_note("Note 2", "Content 2", Some(&personal)),
            sample_note("Note 3", "Content 3", None),
        ];
        self.categories = vec![work, personal];
    }

    /// When enabled, every mutation that passes validation fails with
    /// `SaveFailed`/`DeleteFailed` and leaves data unchanged.
    pub fn fail_writes(&mut self, enabled: bool) {
        self.fail_writes = enabled;
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn log(&self, event: &'static str) -> OperationLog {
        OperationLog::start(&self.config, BACKEND, event)
    }

    fn check_save(&self) -> RepoResult<()> {
        if self.fail_writes {
            return Err(RepoError::SaveFailed(SIMULATED_FAILURE.to_string()));
        }
        Ok(())
    }

    fn check_delete(&self) -> RepoResult<()> {
        if self.fail_writes {
            return Err(RepoError::DeleteFailed(SIMULATED_FAILURE.to_string()));
        }
        Ok(())
    }

    fn category_position(&self, id: CategoryId) -> RepoResult<usize> {
        self.categories
            .iter()
            .position(|category| category.id == id)
            .ok_or_else(|| RepoError::NotFound(format!("category {id}")))
    }

    fn note_position(&self, id: NoteId) -> RepoResult<usize> {
        self.notes
            .iter()
            .position(|note| note.id == id)
            .ok_or_else(|| RepoError::NotFound(format!("note {id}")))
    }

    fn category_name(&self, id: Option<CategoryId>) -> Option<&str> {
        let id = id?;
        self.categories
            .iter()
            .find(|category| category.id == id)
            .map(|category| category.name.as_str())
    }
}

impl NotesRepository for InMemoryNotesRepository {
    fn fetch_categories(&self) -> RepoResult<Vec<Category>> {
        let log = self.log("category_fetch");
        let result = Ok(newest_first(&self.categories, |category| {
            category.created_at
        }));
        log.finish(result, |items| format!("count={}", items.len()))
    }

    fn create_category(&mut self, name: &str) -> RepoResult<Category> {
        let log = self.log("category_create");
        let result = Category::new(name)
            .map_err(RepoError::from)
            .and_then(|category| {
                self.check_save()?;
                self.categories.push(category.clone());
                Ok(category)
            });
        log.finish(result, |category| format!("category_id={}", category.id))
    }

    fn update_category(&mut self, category: &Category, new_name: &str) -> RepoResult<Category> {
        let log = self.log("category_update");
        let result = (|| -> RepoResult<Category> {
            normalize_required("name", new_name)?;
            let position = self.category_position(category.id)?;
            let renamed = self.categories[position].renamed(new_name)?;
            self.check_save()?;
            self.categories[position] = renamed.clone();
            Ok(renamed)
        })();
        log.finish(result, |category| format!("category_id={}", category.id))
    }

    fn delete_category(&mut self, category: &Category) -> RepoResult<usize> {
        let log = self.log("category_delete");
        let result = (|| -> RepoResult<usize> {
            let position = self.category_position(category.id)?;
            self.check_delete()?;
            let before = self.notes.len();
            self.notes.retain(|note| !note.belongs_to(category.id));
            let cascaded = before - self.notes.len();
            self.categories.remove(position);
            Ok(cascaded)
        })();
        log.finish(result, |cascaded| {
            format!("category_id={} cascaded_notes={cascaded}", category.id)
        })
    }

    fn delete_all_categories(&mut self) -> RepoResult<usize> {
        let log = self.log("category_delete_all");
        let result = self.check_delete().map(|()| {
            let ids: HashSet<CategoryId> =
                self.categories.iter().map(|category| category.id).collect();
            self.notes.retain(|note| match note.category_id {
                Some(id) => !ids.contains(&id),
                None => true,
            });
            let deleted = self.categories.len();
            self.categories.clear();
            deleted
        });
        log.finish(result, |deleted| format!("count={deleted}"))
    }

    fn fetch_notes(&self) -> RepoResult<Vec<Note>> {
        let log = self.log("note_fetch");
        let result = Ok(newest_first(&self.notes, |note| note.updated_at));
        log.finish(result, |items| format!("count={}", items.len()))
    }

    fn create_note(
        &mut self,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> RepoResult<Note> {
        let log = self.log("note_create");
        let result = (|| -> RepoResult<Note> {
            let note = Note::new(title, content, category)?;
            if let Some(category_id) = note.category_id {
                self.category_position(category_id)?;
            }
            self.check_save()?;
            self.notes.push(note.clone());
            Ok(note)
        })();
        log.finish(result, |note| format!("note_id={}", note.id))
    }

    fn update_note(
        &mut self,
        note: &Note,
        title: &str,
        content: &str,
        category: Option<&Category>,
    ) -> RepoResult<Note> {
        let log = self.log("note_update");
        let result = (|| -> RepoResult<Note> {
            normalize_required("title", title)?;
            if let Some(category) = category {
                self.category_position(category.id)?;
            }
            let position = self.note_position(note.id)?;
            let edited = self.notes[position].edited(title, content, category)?;
            self.check_save()?;
            self.notes[position] = edited.clone();
            Ok(edited)
        })();
        log.finish(result, |note| format!("note_id={}", note.id))
    }

    fn delete_note(&mut self, note: &Note) -> RepoResult<()> {
        let log = self.log("note_delete");
        let result = (|| -> RepoResult<()> {
            let position = self.note_position(note.id)?;
            self.check_delete()?;
            self.notes.remove(position);
            Ok(())
        })();
        log.finish(result, |_| format!("note_id={}", note.id))
    }

    fn delete_all_notes(&mut self) -> RepoResult<usize> {
        let log = self.log("note_delete_all");
        let result = self.check_delete().map(|()| {
            let deleted = self.notes.len();
            self.notes.clear();
            deleted
        });
        log.finish(result, |deleted| format!("count={deleted}"))
    }

    fn delete_all_data(&mut self) -> RepoResult<DeleteAllSummary> {
        let log = self.log("data_delete_all");
        let result = self.check_delete().map(|()| {
            let summary = DeleteAllSummary {
                categories_deleted: self.categories.len(),
                notes_deleted: self.notes.len(),
            };
            self.notes.clear();
            self.categories.clear();
            summary
        });
        log.finish(result, |summary| {
            format!(
                "categories={} notes={}",
                summary.categories_deleted, summary.notes_deleted
            )
        })
    }

    fn search_notes(&self, text: &str) -> RepoResult<Vec<Note>> {
        let log = self.log("note_search");
        let Some(term) = SearchTerm::parse(text) else {
            return log.finish(Ok(Vec::new()), |_| "count=0 blank_term=true".to_string());
        };

        let hits = newest_first(&self.notes, |note| note.updated_at)
            .into_iter()
            .filter(|note| term.matches_note(note, self.category_name(note.category_id)))
            .collect::<Vec<_>>();
        log.finish(Ok(hits), |hits| format!("count={}", hits.len()))
    }

    fn fetch_notes_for_category(&self, category: &Category) -> RepoResult<Vec<Note>> {
        let log = self.log("note_fetch_for_category");
        let result = Ok(newest_first(&self.notes, |note| note.updated_at)
            .into_iter()
            .filter(|note| note.belongs_to(category.id))
            .collect::<Vec<_>>());
        log.finish(result, |items| {
            format!("category_id={} count={}", category.id, items.len())
        })
    }
}

fn check_fixture_text(
    value: &str,
    entity: &str,
    field: &str,
    id: impl std::fmt::Display,
) -> RepoResult<()> {
    if value.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "fixture {entity} {id} has a blank {field}"
        )));
    }
    if value.trim() != value {
        return Err(RepoError::InvalidData(format!(
            "fixture {entity} {id} has an untrimmed {field}"
        )));
    }
    Ok(())
}

fn check_fixture_timestamps(
    created_at: i64,
    updated_at: i64,
    entity: &str,
    id: impl std::fmt::Display,
) -> RepoResult<()> {
    if created_at > updated_at {
        return Err(RepoError::InvalidData(format!(
            "fixture {entity} {id} has created_at {created_at} after updated_at {updated_at}"
        )));
    }
    Ok(())
}

fn sample_category(name: &str) -> Category {
    let now = now_epoch_ms();
    Category {
        id: CategoryId::new(),
        name: name.to_string(),
        created_at: now,
        updated_at: now,
    }
}

fn sample_note(title: &str, content: &str, category: Option<&Category>) -> Note {
    let now = now_epoch_ms();
    Note {
        id: NoteId::new(),
        title: title.to_string(),
        content: content.to_string(),
        category_id: category.map(|value| value.id),
        created_at: now,
        updated_at: now,
    }
}
