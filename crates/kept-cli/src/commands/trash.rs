use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::NoteService;

use crate::commands::common::{format_trash_lines, note_to_trash_item, TrashListItem};
use crate::error::CliError;

pub async fn run_trash<B: NoteBackend>(
    service: &NoteService<B>,
    as_json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let trash = service.list_trash().await?;
    let retention = service.trash_retention().await;

    if as_json {
        let json_items = trash
            .iter()
            .map(|note| note_to_trash_item(note, retention))
            .collect::<Vec<TrashListItem>>();
        writeln!(out, "{}", serde_json::to_string_pretty(&json_items)?)?;
    } else if trash.is_empty() {
        writeln!(out, "Trash is empty")?;
    } else {
        for line in format_trash_lines(&trash, retention) {
            writeln!(out, "{line}")?;
        }
    }

    Ok(())
}
