use std::io::Write;

use kept_core::backend::NoteBackend;
use kept_core::NoteService;

use crate::commands::common::normalize_search_query;
use crate::commands::list::write_notes;
use crate::error::CliError;

pub async fn run_search<B: NoteBackend>(
    service: &NoteService<B>,
    query: &str,
    as_json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let notes = service.search(&normalized_query).await;

    write_notes(&notes, as_json, out)
}
