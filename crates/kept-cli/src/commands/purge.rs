use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::NoteService;

use crate::commands::common::resolve_trashed_note;
use crate::error::CliError;

/// Permanently delete one trashed note.
pub async fn run_purge<B: NoteBackend>(
    service: &NoteService<B>,
    id: &str,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let note = resolve_trashed_note(id, service).await?;

    service.purge(&note.id).await?;
    writeln!(out, "{}", note.id)?;
    Ok(())
}

/// Permanently delete everything past the retention window.
pub async fn run_purge_expired<B: NoteBackend>(
    service: &NoteService<B>,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let purged = service.purge_expired().await?;

    for id in &purged {
        writeln!(out, "{id}")?;
    }
    tracing::info!("Purged {} expired notes", purged.len());
    Ok(())
}
