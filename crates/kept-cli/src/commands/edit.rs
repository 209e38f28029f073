use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::{Note, NotePatch, NoteService};

use crate::commands::common::{capture_editor_input_with_initial, resolve_active_note};
use crate::error::CliError;

pub async fn run_edit<B: NoteBackend>(
    service: &NoteService<B>,
    id: &str,
    title: Option<String>,
    content: Option<String>,
    out: &mut impl Write,
) -> Result<Note, CliError> {
    let note = resolve_active_note(id, service).await?;

    let content = if title.is_none() && content.is_none() {
        let Some(edited_content) = capture_editor_input_with_initial(&note.content)? else {
            return Err(CliError::EmptyEditedContent);
        };
        Some(edited_content)
    } else {
        content
    };

    let patch = NotePatch {
        title: title.map(|title| title.trim().to_string()),
        content: content.map(|content| content.trim().to_string()),
        ..NotePatch::default()
    };

    let mut edited = note.clone();
    patch.apply(&mut edited);
    if edited.title == note.title && edited.content == note.content {
        writeln!(out, "{}", note.id)?;
        return Ok(note);
    }

    let updated = service.update(&note.id, patch).await?;
    writeln!(out, "{}", updated.id)?;
    Ok(updated)
}
