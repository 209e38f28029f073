use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::NoteService;

use crate::commands::common::resolve_active_note;
use crate::error::CliError;

pub async fn run_delete<B: NoteBackend>(
    service: &NoteService<B>,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let note = resolve_active_note(id, service).await?;

    service.delete(&note.id).await?;
    writeln!(out, "{}", note.id)?;
    Ok(())
}
