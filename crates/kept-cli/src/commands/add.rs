use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::{Note, NoteService};

use crate::commands::common::build_draft;
use crate::error::CliError;

#[derive(Debug, Default)]
pub struct AddOptions {
    pub title: Option<String>,
    pub color: Option<String>,
    pub pin: bool,
    pub archive: bool,
}

pub async fn run_add<B: NoteBackend>(
    service: &NoteService<B>,
    content: Option<String>,
    options: AddOptions,
    out: &mut impl Write,
) -> Result<Note, CliError> {
    let draft = build_draft(
        options.title,
        content,
        options.color.as_deref(),
        options.pin,
        options.archive,
    )?;
    let note = service.create(draft).await?;

    writeln!(out, "{}", note.id)?;
    Ok(note)
}
