//! Durable mirror behind a load/save contract.
//!
//! # Responsibility
//! - Define the collaborator contract used by `NoteService`.
//! - Provide an in-process store and a SQLite-backed store.
//!
//! # Invariants
//! - `load` returns the full note set (possibly empty) in thread-grouped or
//!   flat order; the repository rebuilds and re-validates it.
//! - `save` replaces the stored set with the given snapshot as a whole.
//! - The in-memory repository stays authoritative; stores never mutate notes.

use crate::db::DbError;
use crate::model::note::Note;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod sqlite_store;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by durable stores.
#[derive(Debug)]
pub enum StoreError {
    /// SQLite bootstrap or query failure.
    Db(DbError),
    /// Persisted rows cannot be decoded into notes.
    InvalidData(String),
    /// Connection lacks a table this store needs.
    MissingRequiredTable(&'static str),
    /// Table lacks a column this store needs.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    /// Store refused the write for a non-database reason.
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid stored note data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "note store requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "note store requires column `{column}` in table `{table}`"
            ),
            Self::Unavailable(message) => write!(f, "note store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Load/save collaborator for the note repository.
pub trait NoteStore {
    /// Returns every stored note. An empty store yields an empty vector.
    fn load(&mut self) -> StoreResult<Vec<Note>>;
    /// Replaces stored contents with `notes`.
    fn save(&mut self, notes: &[Note]) -> StoreResult<()>;
}

/// Store that keeps the last saved snapshot in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryNoteStore {
    notes: Vec<Note>,
    save_count: usize,
}

impl MemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `notes` as already-persisted state.
    pub fn with_notes(notes: Vec<Note>) -> Self {
        Self {
            notes,
            save_count: 0,
        }
    }

    /// Last saved snapshot.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Number of successful `save` calls.
    pub fn save_count(&self) -> usize {
        self.save_count
    }
}

impl NoteStore for MemoryNoteStore {
    fn load(&mut self) -> StoreResult<Vec<Note>> {
        Ok(self.notes.clone())
    }

    fn save(&mut self, notes: &[Note]) -> StoreResult<()> {
        self.notes = notes.to_vec();
        self.save_count += 1;
        Ok(())
    }
}
