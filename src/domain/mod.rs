//! Domain layer: documents as the remote service reports them, and errors.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`document`]: Document model and its processing/enable states

pub mod document;
pub mod error;

pub use document::{Document, DocumentStatus, RunStatus};
pub use error::{KnowledgeFileError, Result};
