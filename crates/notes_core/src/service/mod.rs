//! Caller-side services over `NotesRepository`.
//!
//! # Responsibility
//! - Track per-operation loading/error state for UI hosts.
//! - Keep hosts decoupled from repository error handling.

pub mod loading;
pub mod notes_service;
