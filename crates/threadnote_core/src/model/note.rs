//! Note domain model.
//!
//! # Responsibility
//! - Define the single entity shared by list, detail and board views.
//! - Own text and timestamp validation rules reused by repository writes.
//!
//! # Invariants
//! - `id` is assigned at creation and never changes.
//! - `updated_at >= created_at` for every valid note.
//! - `thread_id` is `Some` if and only if the note is a reply.
//! - Replies are one level deep: a reply never owns replies.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Opaque note identifier, unique across top-level notes and replies.
pub type NoteId = String;

/// Canonical note record.
///
/// Replies are not embedded here; the repository keeps reply order per parent
/// and exposes it through [`NoteThread`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Stable identifier.
    pub id: NoteId,
    /// Display title.
    pub title: String,
    /// Free text body.
    pub content: String,
    /// Display-ordered tags. Duplicates are kept as entered.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    /// Unix epoch milliseconds. Refreshed on every edit.
    pub updated_at: i64,
    /// Parent note id. `None` means top-level note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<NoteId>,
    /// Directed links to other top-level notes. May dangle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connected_thread_ids: Vec<NoteId>,
}

impl Note {
    /// Returns whether this note sits in the root sequence.
    pub fn is_top_level(&self) -> bool {
        self.thread_id.is_none()
    }

    /// Returns whether this note belongs to a parent's reply sequence.
    pub fn is_reply(&self) -> bool {
        self.thread_id.is_some()
    }

    /// Checks field-level invariants that do not depend on other notes.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.updated_at < self.created_at {
            return Err(NoteValidationError::InvalidTimestamps {
                created_at: self.created_at,
                updated_at: self.updated_at,
            });
        }
        Ok(())
    }
}

/// Partial edit applied by `update_note`.
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl NotePatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn tags(mut self, tags: Vec<String>) -> Self {
        self.tags = Some(tags);
        self
    }

    /// Validates only the fields present in this patch.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.as_deref().is_some_and(is_blank) {
            return Err(NoteValidationError::BlankTitle);
        }
        if self.content.as_deref().is_some_and(is_blank) {
            return Err(NoteValidationError::BlankContent);
        }
        Ok(())
    }
}

/// A top-level note together with its ordered replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteThread {
    pub note: Note,
    pub replies: Vec<Note>,
}

/// Validation failures raised before any state change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Title is empty after trimming.
    BlankTitle,
    /// Content is empty after trimming.
    BlankContent,
    /// `updated_at` is earlier than `created_at`.
    InvalidTimestamps { created_at: i64, updated_at: i64 },
    /// Reorder input names an id that is not a top-level note.
    ReorderUnknownId(NoteId),
    /// Reorder input names the same id twice.
    ReorderDuplicateId(NoteId),
    /// Reorder input omits a current top-level id.
    ReorderMissingId(NoteId),
    /// Move index falls outside the root sequence.
    MoveIndexOutOfRange { index: usize, len: usize },
    /// A thread cannot link to itself.
    SelfConnection(NoteId),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "note title must not be blank"),
            Self::BlankContent => write!(f, "note content must not be blank"),
            Self::InvalidTimestamps {
                created_at,
                updated_at,
            } => write!(
                f,
                "updated_at ({updated_at}) must not be earlier than created_at ({created_at})"
            ),
            Self::ReorderUnknownId(id) => write!(f, "reorder names unknown top-level id: {id}"),
            Self::ReorderDuplicateId(id) => write!(f, "reorder names id more than once: {id}"),
            Self::ReorderMissingId(id) => write!(f, "reorder omits top-level id: {id}"),
            Self::MoveIndexOutOfRange { index, len } => {
                write!(f, "move index {index} out of range for {len} notes")
            }
            Self::SelfConnection(id) => write!(f, "note cannot connect to itself: {id}"),
        }
    }
}

impl Error for NoteValidationError {}

/// Emptiness rule shared with presentation callers.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Validates title/content input for create paths.
pub fn validate_text_fields(title: &str, content: &str) -> Result<(), NoteValidationError> {
    if is_blank(title) {
        return Err(NoteValidationError::BlankTitle);
    }
    if is_blank(content) {
        return Err(NoteValidationError::BlankContent);
    }
    Ok(())
}
