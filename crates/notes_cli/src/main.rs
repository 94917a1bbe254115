//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `notes_core` linkage and storage bootstrap outside any UI host.
//! - Print deterministic `key=value` lines for quick local sanity checks.
//!
//! Usage: `notes_cli [DB_PATH]`. Without a path an in-memory database is used.

use notes_core::db::{open_db, open_db_in_memory};
use notes_core::{NotesService, RepositoryConfig, SqliteNotesRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("notes_core ping={}", notes_core::ping());
    println!("notes_core version={}", notes_core::core_version());

    let opened = match std::env::args().nth(1) {
        Some(path) => open_db(path),
        None => open_db_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            eprintln!("error: failed to open notes database: {err}");
            return ExitCode::FAILURE;
        }
    };

    let repo = match SqliteNotesRepository::try_new(&conn, RepositoryConfig::production()) {
        Ok(repo) => repo,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut service = NotesService::new(repo);
    match service.library_stats() {
        Some(stats) => {
            println!("categories={}", stats.categories);
            println!("notes={}", stats.notes);
            println!("categorized_notes={}", stats.categorized_notes);
            ExitCode::SUCCESS
        }
        None => {
            let state = service.loading().state(notes_core::OperationKind::Fetch);
            eprintln!(
                "error: {}",
                state.error_message().unwrap_or("failed to read library stats")
            );
            ExitCode::FAILURE
        }
    }
}
