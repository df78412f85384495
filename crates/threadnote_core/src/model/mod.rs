//! Note domain model.
//!
//! # Responsibility
//! - Define the canonical note shape consumed by every view.
//! - Define the injected identity/clock seams used for creation.
//!
//! # Invariants
//! - Every note is identified by an id unique across threads and replies.
//! - Replies never nest below one level.

pub mod note;
pub mod source;
