use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::NoteService;

use crate::commands::common::resolve_trashed_note;
use crate::error::CliError;

pub async fn run_restore<B: NoteBackend>(
    service: &NoteService<B>,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let note = resolve_trashed_note(id, service).await?;

    let restored = service.restore(&note.id).await?;
    writeln!(out, "{}", restored.id)?;
    Ok(())
}
