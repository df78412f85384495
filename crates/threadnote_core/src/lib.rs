//! Core domain logic for threadnote.
//! This crate is the single source of truth for note and thread invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod store;

pub use config::{default_log_level, ConfigError, CoreConfig, LoggingConfig};
pub use logging::{init_logging, logging_status, LoggingError};
pub use model::note::{is_blank, Note, NoteId, NotePatch, NoteThread, NoteValidationError};
pub use model::source::{Clock, IdGenerator, SequentialIdGenerator, SystemClock, UuidIdGenerator};
pub use repo::note_repo::{NoteRepository, RepoError, RepoResult};
pub use seed::sample_notes;
pub use service::note_service::{NoteService, NoteServiceError, NoteSummary};
pub use service::preview::{note_preview, NotePreview};
pub use store::sqlite_store::SqliteNoteStore;
pub use store::{MemoryNoteStore, NoteStore, StoreError, StoreResult};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
