use std::cell::Cell;
use std::rc::Rc;
use threadnote_core::{
    Clock, MemoryNoteStore, Note, NotePatch, NoteService, NoteServiceError, NoteStore,
    SequentialIdGenerator, StoreError, StoreResult,
};

struct FixedClock(i64);

impl Clock for FixedClock {
    fn now_ms(&self) -> i64 {
        self.0
    }
}

/// Memory store whose saves can be switched off from the test body.
struct FlakyStore {
    inner: MemoryNoteStore,
    fail_saves: Rc<Cell<bool>>,
}

impl NoteStore for FlakyStore {
    fn load(&mut self) -> StoreResult<Vec<Note>> {
        self.inner.load()
    }

    fn save(&mut self, notes: &[Note]) -> StoreResult<()> {
        if self.fail_saves.get() {
            return Err(StoreError::Unavailable("disk full".to_string()));
        }
        self.inner.save(notes)
    }
}

struct BrokenLoadStore;

impl NoteStore for BrokenLoadStore {
    fn load(&mut self) -> StoreResult<Vec<Note>> {
        Err(StoreError::Unavailable("offline".to_string()))
    }

    fn save(&mut self, _notes: &[Note]) -> StoreResult<()> {
        Ok(())
    }
}

fn open_memory() -> NoteService<MemoryNoteStore> {
    NoteService::open_with_sources(
        MemoryNoteStore::new(),
        SequentialIdGenerator::new(),
        FixedClock(5_000),
    )
    .unwrap()
}

fn stored_ids(service: &NoteService<MemoryNoteStore>) -> Vec<String> {
    service
        .store()
        .notes()
        .iter()
        .map(|note| note.id.clone())
        .collect()
}

#[test]
fn each_successful_mutation_saves_thread_grouped_snapshot() {
    let mut service = open_memory();
    let a = service.create_note("A", "body", Vec::new()).unwrap();
    let b = service.create_note("B", "body", Vec::new()).unwrap();
    let reply = service.create_reply(&a.id, "r", "text").unwrap();
    service.connect_thread(&b.id, &a.id).unwrap();

    assert_eq!(service.store().save_count(), 4);
    assert_eq!(stored_ids(&service), vec![b.id.clone(), a.id.clone(), reply.id]);
    assert_eq!(
        service.store().notes()[0].connected_thread_ids,
        vec![a.id.clone()]
    );
}

#[test]
fn rejected_operations_do_not_save() {
    let mut service = open_memory();
    service.create_note("A", "body", Vec::new()).unwrap();

    let err = service.create_note(" ", "body", Vec::new()).unwrap_err();
    assert!(err.is_validation());
    let err = service.create_reply("ghost", "r", "text").unwrap_err();
    assert!(err.is_not_found());
    let err = service
        .update_note("ghost", NotePatch::new().title("x"))
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(service.move_note(0, 4).unwrap_err().is_validation());

    assert_eq!(service.store().save_count(), 1);
}

#[test]
fn reopening_restores_order_replies_and_links() {
    let mut service = open_memory();
    let a = service.create_note("A", "body", Vec::new()).unwrap();
    let b = service.create_note("B", "body", vec!["x".to_string()]).unwrap();
    let reply = service.create_reply(&a.id, "r", "text").unwrap();
    service.connect_thread(&a.id, &b.id).unwrap();
    service.reorder(&[a.id.clone(), b.id.clone()]).unwrap();

    let saved = service.store().clone();
    let reopened = NoteService::open(saved).unwrap();
    let repo = reopened.repository();
    assert_eq!(repo.root_ids(), &[a.id.clone(), b.id.clone()]);
    assert_eq!(repo.replies(&a.id)[0].id, reply.id);
    assert_eq!(
        reopened
            .find_connected_threads(&a.id)
            .into_iter()
            .map(|note| note.id.clone())
            .collect::<Vec<_>>(),
        vec![b.id.clone()]
    );
    assert_eq!(reopened.find_by_id(&b.id).unwrap().tags, vec!["x".to_string()]);
}

#[test]
fn save_failure_is_reported_but_keeps_applied_change() {
    let fail_saves = Rc::new(Cell::new(false));
    let store = FlakyStore {
        inner: MemoryNoteStore::new(),
        fail_saves: Rc::clone(&fail_saves),
    };
    let mut service =
        NoteService::open_with_sources(store, SequentialIdGenerator::new(), FixedClock(1)).unwrap();
    let kept = service.create_note("Kept", "body", Vec::new()).unwrap();

    fail_saves.set(true);
    let err = service.create_note("Unsaved", "body", Vec::new()).unwrap_err();
    assert!(matches!(err, NoteServiceError::Store(StoreError::Unavailable(_))));
    assert_eq!(service.repository().root_len(), 2);
    assert_eq!(service.store().inner.notes().len(), 1);

    fail_saves.set(false);
    service.delete_note(&kept.id).unwrap();
    assert_eq!(service.store().inner.notes().len(), 1);
    assert_eq!(service.store().inner.notes()[0].title, "Unsaved");
}

#[test]
fn load_failure_prevents_open() {
    let err = NoteService::open(BrokenLoadStore).err().unwrap();
    assert!(matches!(err, NoteServiceError::Store(_)));
}

#[test]
fn corrupt_stored_notes_are_rejected_on_open() {
    let orphan = Note {
        id: "r".to_string(),
        title: "orphan".to_string(),
        content: "body".to_string(),
        tags: Vec::new(),
        created_at: 0,
        updated_at: 0,
        thread_id: Some("missing".to_string()),
        connected_thread_ids: Vec::new(),
    };
    let err = NoteService::open(MemoryNoteStore::with_notes(vec![orphan]))
        .err()
        .unwrap();
    assert!(matches!(
        err,
        NoteServiceError::Repo(threadnote_core::RepoError::InvalidData(_))
    ));
}

#[test]
fn strict_and_lenient_delete() {
    let mut service = open_memory();
    let a = service.create_note("A", "body", Vec::new()).unwrap();
    service.create_reply(&a.id, "r", "text").unwrap();

    assert_eq!(service.delete_note(&a.id).unwrap().len(), 2);
    assert!(service.delete_note(&a.id).unwrap_err().is_not_found());
    assert!(!service.delete_note_if_exists(&a.id).unwrap());
    assert_eq!(service.store().save_count(), 3);
    assert!(service.store().notes().is_empty());
}

#[test]
fn seed_only_fills_an_empty_store() {
    let mut service = open_memory();
    assert!(service.seed_if_empty().unwrap());
    assert_eq!(service.repository().len(), 9);
    assert_eq!(service.store().notes().len(), 9);
    assert!(!service.seed_if_empty().unwrap());
    assert_eq!(service.store().save_count(), 1);

    assert_eq!(service.repository().root_len(), 7);
    assert_eq!(service.repository().root_ids()[0], "1");
}

#[test]
fn summaries_follow_board_order() {
    let mut service = open_memory();
    let a = service
        .create_note(
            "Moodboard",
            "![cover](img/cover.png) **Warm** palette with [links](https://x.test)",
            vec!["color".to_string(), "ui".to_string(), "ux".to_string()],
        )
        .unwrap();
    let b = service.create_note("Plain", "just text", Vec::new()).unwrap();
    service.create_reply(&a.id, "r1", "text").unwrap();
    service.connect_thread(&a.id, &b.id).unwrap();

    let summaries = service.summaries();
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].id, b.id);
    assert_eq!(summaries[0].lead_tag, None);
    assert_eq!(summaries[0].extra_tag_count, 0);

    let card = &summaries[1];
    assert_eq!(card.preview_image.as_deref(), Some("img/cover.png"));
    assert_eq!(card.preview_text.as_deref(), Some("Warm palette with links"));
    assert_eq!(card.lead_tag.as_deref(), Some("color"));
    assert_eq!(card.extra_tag_count, 2);
    assert_eq!(card.reply_count, 1);
    assert_eq!(card.connection_count, 1);
    assert_eq!(card.updated_at, 5_000);
}

#[test]
fn reads_delegate_to_repository() {
    let mut service = open_memory();
    let a = service.create_note("Grid systems", "columns", Vec::new()).unwrap();
    service.create_note("Motion", "easing curves", Vec::new()).unwrap();
    let reply = service.create_reply(&a.id, "grid reply", "text").unwrap();

    let hits: Vec<String> = service.search("GRID").iter().map(|n| n.id.clone()).collect();
    assert_eq!(hits, vec![a.id.clone()]);
    assert_eq!(service.thread(&a.id).unwrap().replies, vec![reply.clone()]);
    assert!(service.thread(&reply.id).is_none());
    assert_eq!(service.find_by_id(&reply.id), Some(&reply));
}

#[test]
fn note_serializes_with_camel_case_fields() {
    let mut service = open_memory();
    let a = service.create_note("A", "body", Vec::new()).unwrap();
    let reply = service.create_reply(&a.id, "r", "text").unwrap();

    let value = serde_json::to_value(&reply).unwrap();
    assert_eq!(value["threadId"], a.id.as_str());
    assert_eq!(value["createdAt"], 5_000);
    assert_eq!(value["updatedAt"], 5_000);
    assert!(value.get("connectedThreadIds").is_none());

    let decoded: Note = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, reply);
}
