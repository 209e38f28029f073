use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::{Note, NoteService};

use crate::commands::common::{parse_color, resolve_active_note, short_id};
use crate::error::CliError;

pub async fn run_pin<B: NoteBackend>(
    service: &NoteService<B>,
    id: &str,
    out: &mut impl Write,
) -> Result<Note, CliError> {
    let note = resolve_active_note(id, service).await?;
    let updated = service.toggle_pin(&note.id).await?;

    let state = if updated.is_pinned { "pinned" } else { "unpinned" };
    writeln!(out, "{} {state}", short_id(&updated))?;
    Ok(updated)
}

pub async fn run_archive<B: NoteBackend>(
    service: &NoteService<B>,
    id: &str,
    out: &mut impl Write,
) -> Result<Note, CliError> {
    let note = resolve_active_note(id, service).await?;
    let updated = service.toggle_archive(&note.id).await?;

    let state = if updated.is_archived {
        "archived"
    } else {
        "unarchived"
    };
    writeln!(out, "{} {state}", short_id(&updated))?;
    Ok(updated)
}

pub async fn run_color<B: NoteBackend>(
    service: &NoteService<B>,
    id: &str,
    color: &str,
    out: &mut impl Write,
) -> Result<Note, CliError> {
    let color = parse_color(color)?;
    let note = resolve_active_note(id, service).await?;
    let updated = service.set_color(&note.id, color).await?;

    writeln!(out, "{} {}", short_id(&updated), updated.color)?;
    Ok(updated)
}
