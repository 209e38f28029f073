//! kept-core - Core library for Kept
//!
//! This crate contains the note model, the note store with its undo/redo
//! history, and the storage backends (local libSQL, remote HTTP, memory)
//! shared by the Kept CLI and API server.

pub mod backend;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod search;
pub mod services;
pub mod store;
pub mod util;

pub use backend::{AnyBackend, NoteBackend};
pub use config::{BackendConfig, StoreConfig};
pub use error::{Error, ErrorKind, Result};
pub use models::{Note, NoteColor, NoteDraft, NoteId, NotePatch};
pub use services::NoteService;
pub use store::NoteStore;
