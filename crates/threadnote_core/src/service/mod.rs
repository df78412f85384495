//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and store persistence into use-case APIs.
//! - Keep presentation callers decoupled from storage details.

pub mod note_service;
pub mod preview;
