//! Shared service layer used by frontends.

mod notes;

pub use notes::{HistoryState, NoteService};
