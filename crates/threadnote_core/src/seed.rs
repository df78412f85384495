//! Built-in sample notebook used on first run and in demos.
//!
//! Seven design notes with two replies on the first thread. Connected threads
//! are populated pairwise by hand; nothing keeps them symmetric afterwards.

use crate::model::note::Note;

/// 2023-10-15T00:00:00Z.
const BASE_EPOCH_MS: i64 = 1_697_328_000_000;
const DAY_MS: i64 = 24 * 60 * 60 * 1000;

struct SampleNote {
    id: &'static str,
    title: &'static str,
    content: &'static str,
    tags: &'static [&'static str],
    created_day: i64,
    updated_day: i64,
    thread_id: Option<&'static str>,
    connected: &'static [&'static str],
}

const SAMPLE_NOTES: &[SampleNote] = &[
    SampleNote {
        id: "1",
        title: "Design Thinking Process",
        content: "Design thinking is a non-linear, iterative process that teams use to understand users, challenge assumptions, redefine problems and create innovative solutions to prototype and test.",
        tags: &["design", "process", "creativity"],
        created_day: 0,
        updated_day: 0,
        thread_id: None,
        connected: &["2", "3"],
    },
    SampleNote {
        id: "1-1",
        title: "Reply to Design Thinking",
        content: "I find the Empathize phase particularly important. Without truly understanding user needs, the solutions we design might miss the mark completely.",
        tags: &["design", "empathy"],
        created_day: 1,
        updated_day: 1,
        thread_id: Some("1"),
        connected: &[],
    },
    SampleNote {
        id: "1-2",
        title: "Another thought on Design Thinking",
        content: "The iteration aspect is what makes design thinking so powerful. You can always go back and refine based on new insights.",
        tags: &["design", "iteration"],
        created_day: 2,
        updated_day: 2,
        thread_id: Some("1"),
        connected: &[],
    },
    SampleNote {
        id: "2",
        title: "Atomic Design Methodology",
        content: "Atomic design is a methodology for creating design systems with five distinct levels: Atoms, Molecules, Organisms, Templates, Pages.",
        tags: &["design", "methodology", "systems"],
        created_day: 3,
        updated_day: 5,
        thread_id: None,
        connected: &["1", "5"],
    },
    SampleNote {
        id: "3",
        title: "Dieter Rams' 10 Principles",
        content: "Good design is innovative. Good design makes a product useful. Good design is as little design as possible.",
        tags: &["design", "principles", "minimalism"],
        created_day: 7,
        updated_day: 7,
        thread_id: None,
        connected: &["1", "4"],
    },
    SampleNote {
        id: "4",
        title: "Jony Ive on Simplicity",
        content: "Simplicity is not the absence of clutter; that's a consequence of simplicity.",
        tags: &["design", "simplicity", "apple"],
        created_day: 10,
        updated_day: 12,
        thread_id: None,
        connected: &["3", "6"],
    },
    SampleNote {
        id: "5",
        title: "The Power of Whitespace",
        content: "Whitespace is the empty space between elements in a design composition. It creates balance, helps with visual hierarchy and improves readability.",
        tags: &["design", "whitespace", "composition"],
        created_day: 17,
        updated_day: 18,
        thread_id: None,
        connected: &["2", "7"],
    },
    SampleNote {
        id: "6",
        title: "Typography in UI Design",
        content: "Typography is a critical component of user interface design: typeface, size, line height and spacing all shape the experience.",
        tags: &["design", "typography", "UI"],
        created_day: 21,
        updated_day: 21,
        thread_id: None,
        connected: &["4", "7"],
    },
    SampleNote {
        id: "7",
        title: "Color Theory Basics",
        content: "Color theory is both the science and art of using color: how humans perceive it and how colors mix, match or contrast.",
        tags: &["design", "color", "theory"],
        created_day: 26,
        updated_day: 28,
        thread_id: None,
        connected: &["5", "6"],
    },
];

/// Sample notes in thread-grouped order, ready for `NoteRepository::from_notes`.
pub fn sample_notes() -> Vec<Note> {
    SAMPLE_NOTES
        .iter()
        .map(|sample| Note {
            id: sample.id.to_string(),
            title: sample.title.to_string(),
            content: sample.content.to_string(),
            tags: sample.tags.iter().map(|tag| tag.to_string()).collect(),
            created_at: BASE_EPOCH_MS + sample.created_day * DAY_MS,
            updated_at: BASE_EPOCH_MS + sample.updated_day * DAY_MS,
            thread_id: sample.thread_id.map(str::to_string),
            connected_thread_ids: sample
                .connected
                .iter()
                .map(|id| id.to_string())
                .collect(),
        })
        .collect()
}
