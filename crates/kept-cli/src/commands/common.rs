use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};
use kept_core::backend::NoteBackend;
use kept_core::search::days_until_purge;
use kept_core::util::normalize_text_option;
use kept_core::{BackendConfig, Note, NoteColor, NoteDraft, NoteService, StoreConfig};
use serde::Serialize;

use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub color: NoteColor,
    pub is_pinned: bool,
    pub is_archived: bool,
    pub created_at: String,
    pub updated_at: String,
    pub relative_time: String,
}

#[derive(Debug, Serialize)]
pub struct TrashListItem {
    pub id: String,
    pub title: String,
    pub content: String,
    pub deleted_at: Option<String>,
    pub days_until_purge: i64,
}

/// Store configuration from the environment, with CLI flags taking precedence.
///
/// Without any flag or variable the local database lives in the user data
/// directory.
pub fn resolve_store_config(
    lookup: impl Fn(&str) -> Option<String>,
    cli_db_path: Option<PathBuf>,
    cli_api_url: Option<String>,
) -> Result<StoreConfig, CliError> {
    let mut config = StoreConfig::from_lookup(&lookup)?;

    if let Some(api_url) = normalize_text_option(cli_api_url) {
        config.backend = BackendConfig::remote(&api_url)?;
    } else if let Some(db_path) = cli_db_path {
        config.backend = BackendConfig::Local { db_path };
    } else if normalize_text_option(lookup("KEPT_API_URL")).is_none()
        && normalize_text_option(lookup("KEPT_DB_PATH")).is_none()
    {
        config.backend = BackendConfig::Local {
            db_path: default_db_path(),
        };
    }

    Ok(config)
}

pub fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .map_or_else(|| PathBuf::from(".kept"), |dir| dir.join("kept"))
        .join("kept.db")
}

pub fn short_id(note: &Note) -> String {
    note.id.as_str().chars().take(SHORT_ID_LEN).collect()
}

/// Find a note by exact id or unique id prefix.
pub fn resolve_note<'a>(note_query: &str, notes: &'a [Note]) -> Result<&'a Note, CliError> {
    let note_query = normalize_note_identifier(note_query)?;

    if let Some(note) = notes.iter().find(|note| note.id.as_str() == note_query) {
        return Ok(note);
    }

    let matching: Vec<&Note> = notes
        .iter()
        .filter(|note| note.id.as_str().starts_with(&note_query))
        .collect();

    match matching.as_slice() {
        [] => Err(CliError::NoteNotFound(note_query)),
        [note] => Ok(*note),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(|note| short_id(note))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousNoteId(format!(
                "ID prefix '{note_query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub async fn resolve_active_note<B: NoteBackend>(
    note_query: &str,
    service: &NoteService<B>,
) -> Result<Note, CliError> {
    let notes = service.list_active().await;
    resolve_note(note_query, &notes).cloned()
}

pub async fn resolve_trashed_note<B: NoteBackend>(
    note_query: &str,
    service: &NoteService<B>,
) -> Result<Note, CliError> {
    let trash = service.list_trash().await?;
    resolve_note(note_query, &trash).cloned()
}

pub fn parse_color(value: &str) -> Result<NoteColor, CliError> {
    Ok(NoteColor::from_str(value)?)
}

/// Assemble a draft from command-line pieces. A note needs a title or content.
pub fn build_draft(
    title: Option<String>,
    content: Option<String>,
    color: Option<&str>,
    is_pinned: bool,
    is_archived: bool,
) -> Result<NoteDraft, CliError> {
    let title = normalize_text_option(title).unwrap_or_default();
    let content = content
        .as_deref()
        .and_then(normalize_content)
        .unwrap_or_default();
    if title.is_empty() && content.is_empty() {
        return Err(CliError::EmptyContent);
    }

    let color = color.map(parse_color).transpose()?.unwrap_or_default();
    Ok(NoteDraft::new(title, content)
        .with_color(color)
        .pinned(is_pinned)
        .archived(is_archived))
}

pub fn format_note_lines(notes: &[Note]) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let flags = format!(
                "{}{}",
                if note.is_pinned { '*' } else { ' ' },
                if note.is_archived { 'A' } else { ' ' }
            );
            let preview = note_preview(note, 40);
            let relative_time = format_relative_time(note.updated_at, now);
            format!(
                "{:<13}  {flags}  {:<7}  {preview:<40}  {relative_time}",
                short_id(note),
                note.color.as_str()
            )
        })
        .collect()
}

pub fn format_trash_lines(notes: &[Note], retention: chrono::Duration) -> Vec<String> {
    let now = Utc::now();
    notes
        .iter()
        .map(|note| {
            let preview = note_preview(note, 40);
            let deleted = note
                .deleted_at
                .map_or_else(|| "unknown".to_string(), |at| format_relative_time(at, now));
            let days = days_until_purge(note, now, retention);
            format!(
                "{:<13}  {preview:<40}  deleted {deleted:<10}  purged in {days}d",
                short_id(note)
            )
        })
        .collect()
}

pub fn note_to_list_item(note: &Note) -> NoteListItem {
    NoteListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        color: note.color,
        is_pinned: note.is_pinned,
        is_archived: note.is_archived,
        created_at: note.created_at.to_rfc3339(),
        updated_at: note.updated_at.to_rfc3339(),
        relative_time: format_relative_time(note.updated_at, Utc::now()),
    }
}

pub fn note_to_trash_item(note: &Note, retention: chrono::Duration) -> TrashListItem {
    TrashListItem {
        id: note.id.to_string(),
        title: note.title.clone(),
        content: note.content.clone(),
        deleted_at: note.deleted_at.map(|at| at.to_rfc3339()),
        days_until_purge: days_until_purge(note, Utc::now(), retention),
    }
}

/// Single-line preview: the title, or the first content line when untitled.
pub fn note_preview(note: &Note, max_chars: usize) -> String {
    let first_line = if note.title.trim().is_empty() {
        note.content.lines().next().unwrap_or("").trim()
    } else {
        note.title.trim()
    };
    let collapsed = first_line.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now
        .signed_duration_since(timestamp)
        .num_milliseconds()
        .max(0);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Content from arguments, then piped stdin, then the editor.
pub fn resolve_note_content(content_parts: &[String]) -> Result<Option<String>, CliError> {
    if let Some(content) = normalize_content(&content_parts.join(" ")) {
        return Ok(Some(content));
    }

    if let Some(content) = read_piped_stdin()? {
        return Ok(Some(content));
    }

    capture_editor_input()
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchQuery)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn normalize_note_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyNoteId)
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input() -> Result<Option<String>, CliError> {
    capture_editor_input_with_initial("")
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_note_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let note_content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&note_content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    match Command::new(editor).arg(file_path).status() {
        Ok(status) => {
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // EDITOR may carry arguments, e.g. "code --wait"
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };

            let mut command = Command::new(program);
            command.args(parts).arg(file_path);

            let status = command.status()?;
            if status.success() {
                Ok(())
            } else {
                Err(CliError::EditorFailed(format!(
                    "`{editor}` exited with status {status}"
                )))
            }
        }
        Err(err) => Err(CliError::Io(err)),
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

pub fn create_temp_note_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("kept-note-{}-{now}.md", std::process::id()))
}
