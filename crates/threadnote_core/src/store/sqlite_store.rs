//! SQLite-backed note store.
//!
//! # Responsibility
//! - Persist notes as flat rows carrying `thread_id` plus ordered tag/link rows.
//! - Reload rows in an order the repository can rebuild from.
//!
//! # Invariants
//! - `save` replaces all rows in one IMMEDIATE transaction.
//! - Parents are inserted before replies so `thread_id` foreign keys hold.
//! - `load` returns top-level notes by root position, then replies by position.

use crate::model::note::{Note, NoteId};
use crate::store::{NoteStore, StoreError, StoreResult};
use log::debug;
use rusqlite::{params, Connection, TransactionBehavior};
use std::collections::HashMap;

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    (
        "notes",
        &[
            "id",
            "title",
            "content",
            "thread_id",
            "position",
            "created_at",
            "updated_at",
        ],
    ),
    ("note_tags", &["note_id", "position", "tag"]),
    ("note_links", &["note_id", "position", "target_id"]),
];

/// Note store over a migrated SQLite connection.
pub struct SqliteNoteStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteNoteStore<'conn> {
    /// Wraps a connection returned by `open_db`/`open_db_in_memory`.
    ///
    /// # Errors
    /// - `MissingRequiredTable`/`MissingRequiredColumn` when the schema is not
    ///   migrated.
    pub fn try_new(conn: &'conn mut Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl NoteStore for SqliteNoteStore<'_> {
    fn load(&mut self) -> StoreResult<Vec<Note>> {
        let conn = &*self.conn;
        let mut tags = load_ordered_values(
            conn,
            "SELECT note_id, tag FROM note_tags ORDER BY note_id ASC, position ASC;",
        )?;
        let mut links = load_ordered_values(
            conn,
            "SELECT note_id, target_id FROM note_links ORDER BY note_id ASC, position ASC;",
        )?;

        let mut stmt = conn.prepare(
            "SELECT id, title, content, thread_id, created_at, updated_at
             FROM notes
             ORDER BY (thread_id IS NOT NULL) ASC, position ASC, id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            let id: NoteId = row.get("id")?;
            let note_tags = tags.remove(&id).unwrap_or_default();
            let note_links = links.remove(&id).unwrap_or_default();
            let note = Note {
                id,
                title: row.get("title")?,
                content: row.get("content")?,
                tags: note_tags,
                created_at: row.get("created_at")?,
                updated_at: row.get("updated_at")?,
                thread_id: row.get("thread_id")?,
                connected_thread_ids: note_links,
            };
            note.validate()
                .map_err(|err| StoreError::InvalidData(format!("note `{}`: {err}", note.id)))?;
            notes.push(note);
        }

        if let Some(orphan) = tags.keys().chain(links.keys()).next() {
            return Err(StoreError::InvalidData(format!(
                "tag or link rows reference missing note `{orphan}`"
            )));
        }

        debug!(
            "event=store_load module=store status=ok backend=sqlite notes={}",
            notes.len()
        );
        Ok(notes)
    }

    fn save(&mut self, notes: &[Note]) -> StoreResult<()> {
        let positions = assign_positions(notes);
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute("DELETE FROM note_links;", [])?;
        tx.execute("DELETE FROM note_tags;", [])?;
        tx.execute("DELETE FROM notes WHERE thread_id IS NOT NULL;", [])?;
        tx.execute("DELETE FROM notes;", [])?;

        {
            let mut insert_note = tx.prepare(
                "INSERT INTO notes (id, title, content, thread_id, position, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
            )?;
            let mut insert_tag = tx.prepare(
                "INSERT INTO note_tags (note_id, position, tag) VALUES (?1, ?2, ?3);",
            )?;
            let mut insert_link = tx.prepare(
                "INSERT INTO note_links (note_id, position, target_id) VALUES (?1, ?2, ?3);",
            )?;

            let parents_first = notes
                .iter()
                .zip(&positions)
                .filter(|(note, _)| note.is_top_level())
                .chain(
                    notes
                        .iter()
                        .zip(&positions)
                        .filter(|(note, _)| note.is_reply()),
                );
            for (note, position) in parents_first {
                insert_note.execute(params![
                    note.id,
                    note.title,
                    note.content,
                    note.thread_id,
                    position,
                    note.created_at,
                    note.updated_at,
                ])?;
                for (index, tag) in note.tags.iter().enumerate() {
                    insert_tag.execute(params![note.id, index as i64, tag])?;
                }
                for (index, target_id) in note.connected_thread_ids.iter().enumerate() {
                    insert_link.execute(params![note.id, index as i64, target_id])?;
                }
            }
        }

        tx.commit()?;
        debug!(
            "event=store_save module=store status=ok backend=sqlite notes={}",
            notes.len()
        );
        Ok(())
    }
}

/// Position of each note within its own ordering: root index for top-level
/// notes, index among siblings for replies.
fn assign_positions(notes: &[Note]) -> Vec<i64> {
    let mut next_root = 0_i64;
    let mut next_reply: HashMap<&str, i64> = HashMap::new();
    notes
        .iter()
        .map(|note| match note.thread_id.as_deref() {
            None => {
                let position = next_root;
                next_root += 1;
                position
            }
            Some(parent_id) => {
                let slot = next_reply.entry(parent_id).or_insert(0);
                let position = *slot;
                *slot += 1;
                position
            }
        })
        .collect()
}

fn load_ordered_values(conn: &Connection, sql: &str) -> StoreResult<HashMap<NoteId, Vec<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query([])?;
    let mut values: HashMap<NoteId, Vec<String>> = HashMap::new();
    while let Some(row) = rows.next()? {
        let note_id: NoteId = row.get(0)?;
        let value: String = row.get(1)?;
        values.entry(note_id).or_default().push(value);
    }
    Ok(values)
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    for &(table, columns) in REQUIRED_COLUMNS {
        let present = table_columns(conn, table)?;
        if present.is_empty() {
            return Err(StoreError::MissingRequiredTable(table));
        }
        if let Some(column) = columns
            .iter()
            .copied()
            .find(|column| !present.iter().any(|name| name.as_str() == *column))
        {
            return Err(StoreError::MissingRequiredColumn { table, column });
        }
    }
    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        columns.push(row.get::<_, String>(1)?);
    }
    Ok(columns)
}
