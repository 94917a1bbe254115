//! SQLite-backed `NotesRepository`.
//!
//! # Responsibility
//! - Persist categories and notes in the migrated `categories`/`notes` tables.
//! - Run every multi-statement mutation inside one `IMMEDIATE` transaction.
//!
//! # Invariants
//! - Cascades delete notes before their category. The schema's foreign key
//!   has no `ON DELETE` action, so SQLite rejects the reverse order.
//! - Storage failures map by operation: writes to `SaveFailed`, deletes to
//!   `DeleteFailed`, reads to `Unknown`.
//! - Ordering ties are broken by `rowid DESC` (latest insert first).
//! - Updates start from the stored row, so `id` and `created_at` never come
//!   from the caller's copy.

use crate::config::RepositoryConfig;
use crate::db::migrations::{current_version, latest_version};
use crate::model::category::{Category, CategoryId};
use crate::model::normalize_required;
use crate::model::note::{Note, NoteId};
use crate::repo::{DeleteAllSummary, NotesRepository, OperationLog, RepoError, RepoResult};
use crate::search::SearchTerm;
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};
use uuid::Uuid;

const BACKEND: &str = "sqlite";

const CATEGORY_SELECT_SQL: &str = "SELECT id, name, created_at, updated_at FROM categories";
const NOTE_SELECT_SQL: &str =
    "SELECT id, title, content, category_id, created_at, updated_at FROM notes";

/// Repository over a migrated SQLite connection.
pub struct SqliteNotesRepository<'conn> {
    conn: &'conn Connection,
    config: RepositoryConfig,
}

impl<'conn> SqliteNotesRepository<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `RepoError::Unknown` when the connection schema is not at the latest
    ///   migrated version.
    pub fn try_new(conn: &'conn Connection, config: RepositoryConfig) -> RepoResult<Self> {
        let actual = current_version(conn).map_err(RepoError::unknown)?;
        let expected = latest_version();
        if actual != expected {
            return Err(RepoError::Unknown(format!(
                "notes repository requires schema version {expected}, got {actual}"
            )));
        }
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    fn log(&self, event: &'static str) -> OperationLog {
        OperationLog::start(&self.config, BACKEND, event)
    }

    fn begin(&self) -> rusqlite::Result<Transaction<'conn>> {
        Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
    }

    fn ensure_category_exists(&self, id: CategoryId) -> RepoResult<()> {
        if category_exists(self.conn, id).map_err(RepoError::unknown)? {
            Ok(())
        } else {
            Err(category_not_found(id))
        }
    }

    fn query_notes(&self, sql: &str, bind: Option<String>) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(sql).map_err(RepoError::unknown)?;
        let mut rows = match bind {
            Some(value) => stmt.query([value]),
            None => stmt.query([]),
        }
        .map_err(RepoError::unknown)?;

        let mut notes = Vec::new();
        while let Some(row) = rows.next().map_err(RepoError::unknown)? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }
}

impl NotesRepository for SqliteNotesRepository<'_> {
    fn fetch_categories(&self) -> RepoResult<Vec<Category>> {
        let log = self.log("category_fetch");
        let result = (|| -> RepoResult<Vec<Category>> {
            let mut stmt = self
                .conn
                .prepare(&format!(
                    "{CATEGORY_SELECT_SQL} ORDER BY created_at DESC, rowid DESC;"
                ))
                .map_err(RepoError::unknown)?;
            let mut rows = stmt.query([]).map_err(RepoError::unknown)?;
            let mut categories = Vec::new();
            while let Some(row) = rows.next().map_err(RepoError::unknown)? {
                categories.push(parse_category_row(row)?);
            }
            Ok(categories)
        })();
        log.finish(result, |items| format!("count={}", items.len()))
    }

    fn create_category(&mut self, name: &str) -> RepoResult<Category> {
        let log = self.log("category_create");
        let result = (|| -> RepoResult<Category> {
            let category = Category::new(name)?;
            self.conn
                .execute(
                    "INSERT INTO categories (id, name, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4);",
                    params![
                        category.id.to_string(),
                        category.name.as_str(),
                        category.created_at,
                        category.updated_at,
                    ],
                )
                .map_err(RepoError::save)?;
            Ok(category)
        })();
        log.finish(result, |category| format!("category_id={}", category.id))
    }

    fn update_category(&mut self, category: &Category, new_name: &str) -> RepoResult<Category> {
        let log = self.log("category_update");
        let result = (|| -> RepoResult<Category> {
            normalize_required("name", new_name)?;
            let tx = self.begin().map_err(RepoError::save)?;
            let stored =
                stored_category(&tx, category.id)?.ok_or_else(|| category_not_found(category.id))?;
            let renamed = stored.renamed(new_name)?;
            tx.execute(
                "UPDATE categories
                 SET name = ?2, updated_at = ?3
                 WHERE id = ?1;",
                params![
                    renamed.id.to_string(),
                    renamed.name.as_str(),
                    renamed.updated_at,
                ],
            )
            .map_err(RepoError::save)?;
            tx.commit().map_err(RepoError::save)?;
            Ok(renamed)
        })();
        log.finish(result, |category| format!("category_id={}", category.id))
    }

    fn delete_category(&mut self, category: &Category) -> RepoResult<usize> {
        let log = self.log("category_delete");
        let result = (|| -> RepoResult<usize> {
            let tx = self.begin().map_err(RepoError::delete)?;
            if !category_exists(&tx, category.id).map_err(RepoError::delete)? {
                return Err(category_not_found(category.id));
            }

            let id = category.id.to_string();
            let cascaded = tx
                .execute("DELETE FROM notes WHERE category_id = ?1;", [id.as_str()])
                .map_err(RepoError::delete)?;
            tx.execute("DELETE FROM categories WHERE id = ?1;", [id.as_str()])
                .map_err(RepoError::delete)?;
            tx.commit().map_err(RepoError::delete)?;
            Ok(cascaded)
        })();
        log.finish(result, |cascaded| {
            format!("category_id={} cascaded_notes={cascaded}", category.id)
        })
    }

    fn delete_all_categories(&mut self) -> RepoResult<usize> {
        let log = self.log("category_delete_all");
        let result = (|| -> RepoResult<usize> {
            let tx = self.begin().map_err(RepoError::delete)?;
            // Every non-null reference points at an existing category, so this
            // is the per-category cascade applied to all of them at once.
            tx.execute("DELETE FROM notes WHERE category_id IS NOT NULL;", [])
                .map_err(RepoError::delete)?;
            let deleted = tx
                .execute("DELETE FROM categories;", [])
                .map_err(RepoError::delete)?;
            tx.commit().map_err(RepoError::delete)?;
            Ok(deleted)
        })();
        log.finish(result, |deleted| format!("count={deleted}"))
    }

    fn fetch_notes(&self) -> RepoResult<Vec<Note>> {
        let log = self.log("note_fetch");
        let result = self.query_notes(
            &format!("{NOTE_SELECT_SQL} ORDER BY updated_at DESC, rowid DESC;"),
            None,
        );
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
                self.ensure_category_exists(category_id)?;
            }
            self.conn
                .execute(
                    "INSERT INTO notes (id, title, content, category_id, created_at, updated_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                    params![
                        note.id.to_string(),
                        note.title.as_str(),
                        note.content.as_str(),
                        note.category_id.map(|id| id.to_string()),
                        note.created_at,
                        note.updated_at,
                    ],
                )
                .map_err(RepoError::save)?;
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
            let tx = self.begin().map_err(RepoError::save)?;
            if let Some(category) = category {
                if !category_exists(&tx, category.id).map_err(RepoError::save)? {
                    return Err(category_not_found(category.id));
                }
            }
            let stored = stored_note(&tx, note.id)?.ok_or_else(|| note_not_found(note.id))?;
            let edited = stored.edited(title, content, category)?;
            tx.execute(
                "UPDATE notes
                 SET title = ?2, content = ?3, category_id = ?4, updated_at = ?5
                 WHERE id = ?1;",
                params![
                    edited.id.to_string(),
                    edited.title.as_str(),
                    edited.content.as_str(),
                    edited.category_id.map(|id| id.to_string()),
                    edited.updated_at,
                ],
            )
            .map_err(RepoError::save)?;
            tx.commit().map_err(RepoError::save)?;
            Ok(edited)
        })();
        log.finish(result, |note| format!("note_id={}", note.id))
    }

    fn delete_note(&mut self, note: &Note) -> RepoResult<()> {
        let log = self.log("note_delete");
        let result = (|| -> RepoResult<()> {
            let changed = self
                .conn
                .execute("DELETE FROM notes WHERE id = ?1;", [note.id.to_string()])
                .map_err(RepoError::delete)?;
            if changed == 0 {
                return Err(note_not_found(note.id));
            }
            Ok(())
        })();
        log.finish(result, |_| format!("note_id={}", note.id))
    }

    fn delete_all_notes(&mut self) -> RepoResult<usize> {
        let log = self.log("note_delete_all");
        let result = self
            .conn
            .execute("DELETE FROM notes;", [])
            .map_err(RepoError::delete);
        log.finish(result, |deleted| format!("count={deleted}"))
    }

    fn delete_all_data(&mut self) -> RepoResult<DeleteAllSummary> {
        let log = self.log("data_delete_all");
        let result = (|| -> RepoResult<DeleteAllSummary> {
            let tx = self.begin().map_err(RepoError::delete)?;
            let notes_deleted = tx
                .execute("DELETE FROM notes;", [])
                .map_err(RepoError::delete)?;
            let categories_deleted = tx
                .execute("DELETE FROM categories;", [])
                .map_err(RepoError::delete)?;
            tx.commit().map_err(RepoError::delete)?;
            Ok(DeleteAllSummary {
                categories_deleted,
                notes_deleted,
            })
        })();
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

        let result = (|| -> RepoResult<Vec<Note>> {
            let mut stmt = self
                .conn
                .prepare(
                    "SELECT
                        n.id,
                        n.title,
                        n.content,
                        n.category_id,
                        n.created_at,
                        n.updated_at,
                        c.name AS category_name
                     FROM notes n
                     LEFT JOIN categories c ON c.id = n.category_id
                     ORDER BY n.updated_at DESC, n.rowid DESC;",
                )
                .map_err(RepoError::unknown)?;
            let mut rows = stmt.query([]).map_err(RepoError::unknown)?;
            let mut hits = Vec::new();
            while let Some(row) = rows.next().map_err(RepoError::unknown)? {
                let note = parse_note_row(row)?;
                let category_name: Option<String> =
                    row.get("category_name").map_err(RepoError::unknown)?;
                if term.matches_note(&note, category_name.as_deref()) {
                    hits.push(note);
                }
            }
            Ok(hits)
        })();
        log.finish(result, |hits| format!("count={}", hits.len()))
    }

    fn fetch_notes_for_category(&self, category: &Category) -> RepoResult<Vec<Note>> {
        let log = self.log("note_fetch_for_category");
        let result = self.query_notes(
            &format!(
                "{NOTE_SELECT_SQL} WHERE category_id = ?1 ORDER BY updated_at DESC, rowid DESC;"
            ),
            Some(category.id.to_string()),
        );
        log.finish(result, |items| {
            format!("category_id={} count={}", category.id, items.len())
        })
    }
}

fn category_exists(conn: &Connection, id: CategoryId) -> rusqlite::Result<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

/// Loads the stored category inside a write; storage errors are `SaveFailed`.
fn stored_category(conn: &Connection, id: CategoryId) -> RepoResult<Option<Category>> {
    let mut stmt = conn
        .prepare(&format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"))
        .map_err(RepoError::save)?;
    let mut rows = stmt.query([id.to_string()]).map_err(RepoError::save)?;
    let category = match rows.next().map_err(RepoError::save)? {
        Some(row) => Some(parse_category_row(row)?),
        None => None,
    };
    Ok(category)
}

fn stored_note(conn: &Connection, id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn
        .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))
        .map_err(RepoError::save)?;
    let mut rows = stmt.query([id.to_string()]).map_err(RepoError::save)?;
    let note = match rows.next().map_err(RepoError::save)? {
        Some(row) => Some(parse_note_row(row)?),
        None => None,
    };
    Ok(note)
}

fn category_not_found(id: CategoryId) -> RepoError {
    RepoError::NotFound(format!("category {id}"))
}

fn note_not_found(id: NoteId) -> RepoError {
    RepoError::NotFound(format!("note {id}"))
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id_text: String = row.get("id").map_err(RepoError::unknown)?;
    Ok(Category {
        id: CategoryId(parse_uuid(&id_text, "categories.id")?),
        name: row.get("name").map_err(RepoError::unknown)?,
        created_at: row.get("created_at").map_err(RepoError::unknown)?,
        updated_at: row.get("updated_at").map_err(RepoError::unknown)?,
    })
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id_text: String = row.get("id").map_err(RepoError::unknown)?;
    let category_text: Option<String> = row.get("category_id").map_err(RepoError::unknown)?;
    let category_id = match category_text {
        Some(value) => Some(CategoryId(parse_uuid(&value, "notes.category_id")?)),
        None => None,
    };

    Ok(Note {
        id: NoteId(parse_uuid(&id_text, "notes.id")?),
        title: row.get("title").map_err(RepoError::unknown)?,
        content: row.get("content").map_err(RepoError::unknown)?,
        category_id,
        created_at: row.get("created_at").map_err(RepoError::unknown)?,
        updated_at: row.get("updated_at").map_err(RepoError::unknown)?,
    })
}

fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::Unknown(format!("invalid uuid value `{value}` in {column}")))
}
