//! In-memory note repository.
//!
//! # Responsibility
//! - Own every note, the root display order and per-thread reply order.
//! - Provide create/update/delete/reorder and lookup operations.
//!
//! # Invariants
//! - Ids are unique across top-level notes and replies (one flat map).
//! - Every reply's `thread_id` names a top-level note whose reply list holds it.
//! - `root_order` holds exactly the top-level ids; `replies` has one entry per
//!   top-level id.
//! - Every operation validates fully before mutating; failures leave state
//!   untouched.

use crate::model::note::{
    validate_text_fields, Note, NoteId, NotePatch, NoteThread, NoteValidationError,
};
use crate::model::source::{Clock, IdGenerator, SystemClock, UuidIdGenerator};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note mutations and reconstruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    /// Input rejected before any state change.
    Validation(NoteValidationError),
    /// Referenced id does not resolve where existence is required.
    NotFound(NoteId),
    /// Id source produced an id that is already in use.
    DuplicateId(NoteId),
    /// Loaded notes violate structural invariants.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::DuplicateId(id) => write!(f, "note id already in use: {id}"),
            Self::InvalidData(message) => write!(f, "invalid note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::DuplicateId(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Single source of truth for notes, replies and board order.
pub struct NoteRepository {
    notes: HashMap<NoteId, Note>,
    root_order: Vec<NoteId>,
    replies: HashMap<NoteId, Vec<NoteId>>,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl Debug for NoteRepository {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteRepository")
            .field("notes", &self.notes.len())
            .field("root_order", &self.root_order)
            .finish_non_exhaustive()
    }
}

impl Default for NoteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteRepository {
    /// Creates an empty repository with UUID ids and the wall clock.
    pub fn new() -> Self {
        Self::with_sources(UuidIdGenerator, SystemClock)
    }

    /// Creates an empty repository with caller-provided id and time sources.
    pub fn with_sources(ids: impl IdGenerator + 'static, clock: impl Clock + 'static) -> Self {
        Self {
            notes: HashMap::new(),
            root_order: Vec::new(),
            replies: HashMap::new(),
            ids: Box::new(ids),
            clock: Box::new(clock),
        }
    }

    /// Rebuilds a repository from flat records.
    ///
    /// See [`NoteRepository::replace_all`] for ordering and validation rules.
    pub fn from_notes(
        notes: Vec<Note>,
        ids: impl IdGenerator + 'static,
        clock: impl Clock + 'static,
    ) -> RepoResult<Self> {
        let mut repo = Self::with_sources(ids, clock);
        repo.replace_all(notes)?;
        Ok(repo)
    }

    /// Replaces every note with `notes`, keeping the id and clock sources.
    ///
    /// Top-level notes keep their relative order as the root sequence, and
    /// replies keep their relative order within each parent. Nothing changes
    /// when validation fails.
    ///
    /// # Errors
    /// - `InvalidData` on duplicate ids, orphan or nested replies, or
    ///   `updated_at < created_at`.
    pub fn replace_all(&mut self, notes: Vec<Note>) -> RepoResult<()> {
        let mut by_id: HashMap<NoteId, Note> = HashMap::with_capacity(notes.len());
        let mut root_order = Vec::new();
        let mut replies: HashMap<NoteId, Vec<NoteId>> = HashMap::new();
        let mut pending_replies = Vec::new();

        for note in notes {
            note.validate()
                .map_err(|err| RepoError::InvalidData(format!("note `{}`: {err}", note.id)))?;
            if by_id.contains_key(&note.id) {
                return Err(RepoError::InvalidData(format!(
                    "duplicate note id `{}`",
                    note.id
                )));
            }

            match note.thread_id.clone() {
                Some(parent_id) => pending_replies.push((note.id.clone(), parent_id)),
                None => {
                    root_order.push(note.id.clone());
                    replies.insert(note.id.clone(), Vec::new());
                }
            }
            by_id.insert(note.id.clone(), note);
        }

        for (reply_id, parent_id) in pending_replies {
            match replies.get_mut(&parent_id) {
                Some(siblings) => siblings.push(reply_id),
                None => {
                    let reason = if by_id.contains_key(&parent_id) {
                        "is itself a reply"
                    } else {
                        "does not exist"
                    };
                    return Err(RepoError::InvalidData(format!(
                        "reply `{reply_id}` points at parent `{parent_id}` which {reason}"
                    )));
                }
            }
        }

        self.notes = by_id;
        self.root_order = root_order;
        self.replies = replies;
        Ok(())
    }

    /// Creates a top-level note at the head of the root sequence.
    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: Vec<String>,
    ) -> RepoResult<Note> {
        let title = title.into();
        let content = content.into();
        validate_text_fields(&title, &content)?;

        let id = self.fresh_id()?;
        let now = self.clock.now_ms();
        let note = Note {
            id: id.clone(),
            title,
            content,
            tags,
            created_at: now,
            updated_at: now,
            thread_id: None,
            connected_thread_ids: Vec::new(),
        };

        self.notes.insert(id.clone(), note.clone());
        self.root_order.insert(0, id.clone());
        self.replies.insert(id, Vec::new());
        Ok(note)
    }

    /// Appends a reply to the end of a top-level note's thread.
    ///
    /// # Errors
    /// - `NotFound(parent_id)` when the parent is missing or is itself a reply.
    pub fn create_reply(
        &mut self,
        parent_id: &str,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> RepoResult<Note> {
        let title = title.into();
        let content = content.into();
        validate_text_fields(&title, &content)?;
        if !self.is_top_level_id(parent_id) {
            return Err(RepoError::NotFound(parent_id.to_string()));
        }

        let id = self.fresh_id()?;
        let now = self.clock.now_ms();
        let reply = Note {
            id: id.clone(),
            title,
            content,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
            thread_id: Some(parent_id.to_string()),
            connected_thread_ids: Vec::new(),
        };

        self.notes.insert(id.clone(), reply.clone());
        self.replies
            .entry(parent_id.to_string())
            .or_default()
            .push(id);
        Ok(reply)
    }

    /// Applies present patch fields to any note and refreshes `updated_at`.
    ///
    /// Never touches `id`, `created_at`, `thread_id`, replies or links.
    pub fn update_note(&mut self, id: &str, patch: NotePatch) -> RepoResult<Note> {
        patch.validate()?;
        let now = self.clock.now_ms();
        let note = self
            .notes
            .get_mut(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?;

        if let Some(title) = patch.title {
            note.title = title;
        }
        if let Some(content) = patch.content {
            note.content = content;
        }
        if let Some(tags) = patch.tags {
            note.tags = tags;
        }
        note.updated_at = now.max(note.created_at);
        Ok(note.clone())
    }

    /// Deletes a note and returns every removed id.
    ///
    /// A top-level note takes its whole reply set with it; a reply is removed
    /// from its parent only. Unknown ids fail with `NotFound`.
    pub fn delete_note(&mut self, id: &str) -> RepoResult<Vec<NoteId>> {
        let thread_id = self
            .notes
            .get(id)
            .ok_or_else(|| RepoError::NotFound(id.to_string()))?
            .thread_id
            .clone();

        match thread_id {
            Some(parent_id) => {
                if let Some(siblings) = self.replies.get_mut(&parent_id) {
                    siblings.retain(|reply_id| reply_id != id);
                }
                self.notes.remove(id);
                Ok(vec![id.to_string()])
            }
            None => {
                let reply_ids = self.replies.remove(id).unwrap_or_default();
                self.root_order.retain(|root_id| root_id != id);
                self.notes.remove(id);
                for reply_id in &reply_ids {
                    self.notes.remove(reply_id);
                }

                let mut removed = Vec::with_capacity(reply_ids.len() + 1);
                removed.push(id.to_string());
                removed.extend(reply_ids);
                Ok(removed)
            }
        }
    }

    /// Replaces the root order with a permutation of the current top-level ids.
    pub fn reorder(&mut self, ordered_ids: &[NoteId]) -> RepoResult<()> {
        self.ensure_root_permutation(ordered_ids)?;
        self.root_order = ordered_ids.to_vec();
        Ok(())
    }

    /// Moves the note at `from_index` so it ends up at `to_index`.
    ///
    /// Mirrors a single drag-and-drop gesture on the board.
    pub fn move_note(&mut self, from_index: usize, to_index: usize) -> RepoResult<()> {
        let len = self.root_order.len();
        for index in [from_index, to_index] {
            if index >= len {
                return Err(NoteValidationError::MoveIndexOutOfRange { index, len }.into());
            }
        }

        let mut order = self.root_order.clone();
        let moved = order.remove(from_index);
        order.insert(to_index, moved);
        self.reorder(&order)
    }

    /// Adds a directed link from one top-level note to another.
    ///
    /// Re-adding an existing link is a no-op. The reverse link is not created.
    pub fn connect_thread(&mut self, from_id: &str, to_id: &str) -> RepoResult<()> {
        if from_id == to_id {
            return Err(NoteValidationError::SelfConnection(from_id.to_string()).into());
        }
        if !self.is_top_level_id(to_id) {
            return Err(RepoError::NotFound(to_id.to_string()));
        }

        let note = self
            .notes
            .get_mut(from_id)
            .filter(|note| note.is_top_level())
            .ok_or_else(|| RepoError::NotFound(from_id.to_string()))?;
        if !note.connected_thread_ids.iter().any(|linked| linked == to_id) {
            note.connected_thread_ids.push(to_id.to_string());
        }
        Ok(())
    }

    /// Removes a directed link. Returns whether a link was present.
    pub fn disconnect_thread(&mut self, from_id: &str, to_id: &str) -> RepoResult<bool> {
        let note = self
            .notes
            .get_mut(from_id)
            .filter(|note| note.is_top_level())
            .ok_or_else(|| RepoError::NotFound(from_id.to_string()))?;
        let before = note.connected_thread_ids.len();
        note.connected_thread_ids.retain(|linked| linked != to_id);
        Ok(note.connected_thread_ids.len() != before)
    }

    /// Looks up any note, top-level or reply.
    pub fn find_by_id(&self, id: &str) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Resolves a note's links to top-level notes, in link order.
    ///
    /// Dangling ids and ids naming replies are skipped.
    pub fn find_connected_threads(&self, id: &str) -> Vec<&Note> {
        let Some(note) = self.notes.get(id) else {
            return Vec::new();
        };
        note.connected_thread_ids
            .iter()
            .filter_map(|linked| self.notes.get(linked).filter(|found| found.is_top_level()))
            .collect()
    }

    /// Case-insensitive substring match on title or content of top-level notes.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        let needle = query.to_lowercase();
        self.top_level_notes()
            .into_iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Top-level notes in board order.
    pub fn top_level_notes(&self) -> Vec<&Note> {
        self.root_order
            .iter()
            .filter_map(|id| self.notes.get(id))
            .collect()
    }

    /// Top-level ids in board order.
    pub fn root_ids(&self) -> &[NoteId] {
        &self.root_order
    }

    /// Replies of one top-level note, oldest first. Empty for unknown ids.
    pub fn replies(&self, parent_id: &str) -> Vec<&Note> {
        self.replies
            .get(parent_id)
            .map(|reply_ids| {
                reply_ids
                    .iter()
                    .filter_map(|reply_id| self.notes.get(reply_id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A top-level note with its replies. `None` for replies and unknown ids.
    pub fn thread(&self, id: &str) -> Option<NoteThread> {
        let note = self.notes.get(id).filter(|note| note.is_top_level())?;
        Some(NoteThread {
            note: note.clone(),
            replies: self.replies(id).into_iter().cloned().collect(),
        })
    }

    /// Flat copy grouped by thread: each top-level note followed by its replies.
    pub fn snapshot(&self) -> Vec<Note> {
        let mut notes = Vec::with_capacity(self.notes.len());
        for root_id in &self.root_order {
            if let Some(note) = self.notes.get(root_id) {
                notes.push(note.clone());
            }
            notes.extend(self.replies(root_id).into_iter().cloned());
        }
        notes
    }

    /// Total note count, replies included.
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    /// Number of top-level notes.
    pub fn root_len(&self) -> usize {
        self.root_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    fn is_top_level_id(&self, id: &str) -> bool {
        self.notes.get(id).is_some_and(Note::is_top_level)
    }

    fn fresh_id(&mut self) -> RepoResult<NoteId> {
        let id = self.ids.next_id();
        if self.notes.contains_key(&id) {
            return Err(RepoError::DuplicateId(id));
        }
        Ok(id)
    }

    fn ensure_root_permutation(&self, ordered_ids: &[NoteId]) -> Result<(), NoteValidationError> {
        let mut seen = HashSet::with_capacity(ordered_ids.len());
        for id in ordered_ids {
            if !self.is_top_level_id(id) {
                return Err(NoteValidationError::ReorderUnknownId(id.clone()));
            }
            if !seen.insert(id.as_str()) {
                return Err(NoteValidationError::ReorderDuplicateId(id.clone()));
            }
        }
        if let Some(missing) = self
            .root_order
            .iter()
            .find(|id| !seen.contains(id.as_str()))
        {
            return Err(NoteValidationError::ReorderMissingId(missing.clone()));
        }
        Ok(())
    }
}
