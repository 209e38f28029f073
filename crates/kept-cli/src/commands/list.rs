use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::search::partition_pinned;
use kept_core::{Note, NoteService};

use crate::commands::common::{format_note_lines, note_to_list_item, NoteListItem};
use crate::error::CliError;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ListScope {
    /// Unarchived notes, as on the main board
    Visible,
    Archived,
    All,
}

pub async fn run_list<B: NoteBackend>(
    service: &NoteService<B>,
    scope: ListScope,
    as_json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let notes = match scope {
        ListScope::Visible => service.list_visible().await,
        ListScope::Archived => service.list_archived().await,
        ListScope::All => service.list_active().await,
    };

    write_notes(&pinned_first(&notes), as_json, out)
}

/// Pinned notes ahead of the rest, each group in collection order.
pub fn pinned_first(notes: &[Note]) -> Vec<Note> {
    let (pinned, others) = partition_pinned(notes);
    pinned.into_iter().chain(others).cloned().collect()
}

pub fn write_notes(notes: &[Note], as_json: bool, out: &mut impl Write) -> Result<(), CliError> {
    if as_json {
        let json_items = notes
            .iter()
            .map(note_to_list_item)
            .collect::<Vec<NoteListItem>>();
        writeln!(out, "{}", serde_json::to_string_pretty(&json_items)?)?;
    } else {
        for line in format_note_lines(notes) {
            writeln!(out, "{line}")?;
        }
    }

    Ok(())
}
