//! Note use-case service.
//!
//! # Responsibility
//! - Load the store before the repository accepts operations.
//! - Forward mutations to the repository and mirror each success to the store.
//! - Build list/board card summaries.
//!
//! # Invariants
//! - Rejected operations never reach the store.
//! - Save failures are reported but never roll back in-memory state.

use crate::model::note::{Note, NotePatch, NoteThread};
use crate::model::source::{Clock, IdGenerator};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult};
use crate::seed::sample_notes;
use crate::service::preview::note_preview;
use crate::store::{NoteStore, StoreError};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Repository rejected the operation; nothing changed.
    Repo(RepoError),
    /// Store failed to load, or to save after an applied change.
    Store(StoreError),
}

impl NoteServiceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Repo(RepoError::NotFound(_)))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Repo(RepoError::Validation(_)))
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "note store failure: {err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<StoreError> for NoteServiceError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Card read model for list and board views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    pub id: String,
    pub title: String,
    /// Markdown-stripped content, at most 100 chars.
    pub preview_text: Option<String>,
    pub preview_image: Option<String>,
    /// First tag in display order.
    pub lead_tag: Option<String>,
    /// Tags beyond `lead_tag`.
    pub extra_tag_count: usize,
    pub reply_count: usize,
    /// Raw link count, dangling links included.
    pub connection_count: usize,
    pub updated_at: i64,
}

/// Note service facade over the repository and its durable mirror.
pub struct NoteService<S: NoteStore> {
    repo: NoteRepository,
    store: S,
}

impl<S: NoteStore> NoteService<S> {
    /// Loads `store` into a repository using UUID ids and the wall clock.
    pub fn open(store: S) -> Result<Self, NoteServiceError> {
        Self::open_with_repository(store, NoteRepository::new())
    }

    /// Loads `store` into a repository using the given id and time sources.
    pub fn open_with_sources(
        store: S,
        ids: impl IdGenerator + 'static,
        clock: impl Clock + 'static,
    ) -> Result<Self, NoteServiceError> {
        Self::open_with_repository(store, NoteRepository::with_sources(ids, clock))
    }

    fn open_with_repository(mut store: S, mut repo: NoteRepository) -> Result<Self, NoteServiceError> {
        let started_at = Instant::now();
        let notes = store.load().map_err(|err| {
            error!(
                "event=notes_load module=service status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            NoteServiceError::Store(err)
        })?;
        repo.replace_all(notes).map_err(|err| {
            error!(
                "event=notes_load module=service status=error error_code={} error={}",
                error_code(&err),
                err
            );
            NoteServiceError::Repo(err)
        })?;

        info!(
            "event=notes_load module=service status=ok notes={} threads={} duration_ms={}",
            repo.len(),
            repo.root_len(),
            started_at.elapsed().as_millis()
        );
        Ok(Self { repo, store })
    }

    /// Read access for views.
    pub fn repository(&self) -> &NoteRepository {
        &self.repo
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Note, NoteServiceError> {
        self.mutate("note_create", |repo| repo.create_note(title, content, tags))
    }

    pub fn create_reply(
        &mut self,
        parent_id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Note, NoteServiceError> {
        self.mutate("reply_create", |repo| {
            repo.create_reply(parent_id, title, content)
        })
    }

    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> Result<Note, NoteServiceError> {
        self.mutate("note_update", |repo| repo.update_note(id, patch))
    }

    /// Strict delete: unknown ids fail with `NotFound`.
    pub fn delete_note(&mut self, id: &str) -> Result<Vec<String>, NoteServiceError> {
        self.mutate("note_delete", |repo| repo.delete_note(id))
    }

    /// Lenient delete for UI callers: stale ids return `Ok(false)`.
    pub fn delete_note_if_exists(&mut self, id: &str) -> Result<bool, NoteServiceError> {
        if self.repo.find_by_id(id).is_none() {
            debug!("event=note_delete module=service status=skipped reason=stale_id");
            return Ok(false);
        }
        self.delete_note(id).map(|_| true)
    }

    pub fn reorder(&mut self, ordered_ids: &[String]) -> Result<(), NoteServiceError> {
        self.mutate("notes_reorder", |repo| repo.reorder(ordered_ids))
    }

    pub fn move_note(&mut self, from_index: usize, to_index: usize) -> Result<(), NoteServiceError> {
        self.mutate("note_move", |repo| repo.move_note(from_index, to_index))
    }

    pub fn connect_thread(&mut self, from_id: &str, to_id: &str) -> Result<(), NoteServiceError> {
        self.mutate("thread_connect", |repo| repo.connect_thread(from_id, to_id))
    }

    pub fn disconnect_thread(&mut self, from_id: &str, to_id: &str) -> Result<bool, NoteServiceError> {
        self.mutate("thread_disconnect", |repo| {
            repo.disconnect_thread(from_id, to_id)
        })
    }

    /// Loads the sample notebook when nothing is stored yet.
    ///
    /// Returns whether seeding happened.
    pub fn seed_if_empty(&mut self) -> Result<bool, NoteServiceError> {
        if !self.repo.is_empty() {
            return Ok(false);
        }
        self.mutate("notes_seed", |repo| repo.replace_all(sample_notes()))?;
        Ok(true)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Note> {
        self.repo.find_by_id(id)
    }

    pub fn find_connected_threads(&self, id: &str) -> Vec<&Note> {
        self.repo.find_connected_threads(id)
    }

    pub fn search(&self, query: &str) -> Vec<&Note> {
        self.repo.search(query)
    }

    pub fn thread(&self, id: &str) -> Option<NoteThread> {
        self.repo.thread(id)
    }

    /// Card summaries for top-level notes in board order.
    pub fn summaries(&self) -> Vec<NoteSummary> {
        self.repo
            .top_level_notes()
            .into_iter()
            .map(|note| {
                let preview = note_preview(&note.content);
                NoteSummary {
                    id: note.id.clone(),
                    title: note.title.clone(),
                    preview_text: preview.text,
                    preview_image: preview.image,
                    lead_tag: note.tags.first().cloned(),
                    extra_tag_count: note.tags.len().saturating_sub(1),
                    reply_count: self.repo.replies(&note.id).len(),
                    connection_count: note.connected_thread_ids.len(),
                    updated_at: note.updated_at,
                }
            })
            .collect()
    }

    fn mutate<T>(
        &mut self,
        operation: &'static str,
        apply: impl FnOnce(&mut NoteRepository) -> RepoResult<T>,
    ) -> Result<T, NoteServiceError> {
        let value = apply(&mut self.repo).map_err(|err| {
            warn!(
                "event={operation} module=service status=rejected error_code={}",
                error_code(&err)
            );
            NoteServiceError::Repo(err)
        })?;
        self.persist(operation)?;
        Ok(value)
    }

    fn persist(&mut self, operation: &'static str) -> Result<(), NoteServiceError> {
        let started_at = Instant::now();
        let snapshot = self.repo.snapshot();
        match self.store.save(&snapshot) {
            Ok(()) => {
                info!(
                    "event={operation} module=service status=ok notes={} duration_ms={}",
                    snapshot.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={operation} module=service status=error error_code=save_failed duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(NoteServiceError::Store(err))
            }
        }
    }
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Validation(_) => "validation",
        RepoError::NotFound(_) => "not_found",
        RepoError::DuplicateId(_) => "duplicate_id",
        RepoError::InvalidData(_) => "invalid_data",
    }
}
