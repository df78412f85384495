//! Repository layer.
//!
//! # Responsibility
//! - Hold the authoritative in-memory note collection.
//! - Return semantic errors (`Validation`, `NotFound`) for rejected operations.
//!
//! # Invariants
//! - Mutations are atomic: validate fully, then apply.
//! - Storage is not touched here; see `store` for the durable mirror.

pub mod note_repo;
