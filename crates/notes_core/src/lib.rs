//! Core data layer for the notes app.
//! This crate is the single source of truth for category/note invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::{AppEnvironment, RepositoryConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::note::{Note, NoteId};
pub use model::ValidationError;
pub use repo::memory_repo::InMemoryNotesRepository;
pub use repo::sqlite_repo::SqliteNotesRepository;
pub use repo::{DeleteAllSummary, NotesRepository, RepoError, RepoResult};
pub use search::{search_preview, SearchTerm};
pub use service::loading::{LoadingState, LoadingTracker, OperationKind};
pub use service::notes_service::{LibraryStats, NotesService, DEFAULT_SUGGESTION_LIMIT};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
