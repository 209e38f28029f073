//! Data models for Kept

mod color;
mod note;

pub use color::NoteColor;
pub use note::{Note, NoteDraft, NoteId, NotePatch};
