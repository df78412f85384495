//! Identity and clock sources injected into the repository.
//!
//! # Invariants
//! - Generators must not repeat ids within one process.
//! - Clock values are Unix epoch milliseconds.

use crate::model::note::NoteId;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// Source of fresh note ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> NoteId;
}

/// Source of current time in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Default generator producing UUID v4 text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> NoteId {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic generator yielding `"1"`, `"2"`, ...
///
/// Used by fixtures and tests where readable ids matter.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts numbering after `last`.
    pub fn starting_after(last: u64) -> Self {
        Self { next: last }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> NoteId {
        self.next += 1;
        self.next.to_string()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        // Pre-epoch system time collapses to 0 rather than failing.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }
}
