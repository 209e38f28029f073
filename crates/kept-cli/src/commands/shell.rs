//! Interactive session over one long-lived store.
//!
//! One-shot commands start a fresh store per process, so undo and redo only
//! mean something here.

use std::io::{self, BufRead, Write};

use kept_core::backend::NoteBackend;
use kept_core::NoteService;

use crate::commands::add::{run_add, AddOptions};
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::flags::{run_archive, run_color, run_pin};
use crate::commands::list::{run_list, ListScope};
use crate::commands::purge::{run_purge, run_purge_expired};
use crate::commands::restore::run_restore;
use crate::commands::search::run_search;
use crate::commands::trash::run_trash;
use crate::error::CliError;

const HELP: &str = "\
Commands:
  new <text>                 create a note (use 'Title | text' to set a title)
  edit <id> [text]           replace the content (opens $EDITOR without text)
  pin <id>                   toggle pinned
  archive <id>               toggle archived
  color <id> <color>         set the color
  rm <id>                    move to trash
  restore <id>               bring back from trash
  purge <id> | purge expired delete from trash for good (not undoable)
  undo | redo                step through history
  ls [archived|all]          list notes, pinned first
  find <query>               search titles and content
  trash                      list trashed notes
  help                       show this help
  quit                       leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    New {
        title: Option<String>,
        content: Option<String>,
    },
    Edit {
        id: String,
        content: Option<String>,
    },
    Pin(String),
    Archive(String),
    Color {
        id: String,
        color: String,
    },
    Remove(String),
    Restore(String),
    Purge(String),
    PurgeExpired,
    Undo,
    Redo,
    List(ListScope),
    Find(String),
    Trash,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Quit,
}

fn usage(text: &str) -> CliError {
    CliError::Shell(format!("usage: {text}"))
}

fn single_id(rest: &str, text: &str) -> Result<String, CliError> {
    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(id), None) => Ok(id.to_string()),
        _ => Err(usage(text)),
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ShellCommand>, CliError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(word, rest)| (word, rest.trim()));

    let command = match word.to_ascii_lowercase().as_str() {
        "new" | "add" => {
            let (title, content) = match rest.split_once('|') {
                Some((title, content)) => (non_empty(title), non_empty(content)),
                None => (None, non_empty(rest)),
            };
            if title.is_none() && content.is_none() {
                return Err(usage("new <text> | new <title> | <text>"));
            }
            ShellCommand::New { title, content }
        }
        "edit" => {
            let (id, content) = rest
                .split_once(char::is_whitespace)
                .map_or((rest, ""), |(id, content)| (id, content));
            if id.is_empty() {
                return Err(usage("edit <id> [text]"));
            }
            ShellCommand::Edit {
                id: id.to_string(),
                content: non_empty(content),
            }
        }
        "pin" => ShellCommand::Pin(single_id(rest, "pin <id>")?),
        "archive" => ShellCommand::Archive(single_id(rest, "archive <id>")?),
        "color" => {
            let mut parts = rest.split_whitespace();
            match (parts.next(), parts.next(), parts.next()) {
                (Some(id), Some(color), None) => ShellCommand::Color {
                    id: id.to_string(),
                    color: color.to_string(),
                },
                _ => return Err(usage("color <id> <color>")),
            }
        }
        "rm" | "delete" => ShellCommand::Remove(single_id(rest, "rm <id>")?),
        "restore" => ShellCommand::Restore(single_id(rest, "restore <id>")?),
        "purge" => match rest {
            "expired" | "--expired" => ShellCommand::PurgeExpired,
            _ => ShellCommand::Purge(single_id(rest, "purge <id> | purge expired")?),
        },
        "undo" => ShellCommand::Undo,
        "redo" => ShellCommand::Redo,
        "ls" | "list" => match rest {
            "" => ShellCommand::List(ListScope::Visible),
            "archived" => ShellCommand::List(ListScope::Archived),
            "all" => ShellCommand::List(ListScope::All),
            _ => return Err(usage("ls [archived|all]")),
        },
        "find" | "search" => ShellCommand::Find(
            non_empty(rest).ok_or_else(|| usage("find <query>"))?,
        ),
        "trash" => ShellCommand::Trash,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" | "q" => ShellCommand::Quit,
        other => {
            return Err(CliError::Shell(format!(
                "unknown command '{other}', try 'help'"
            )))
        }
    };

    Ok(Some(command))
}

pub async fn execute<B: NoteBackend>(
    service: &NoteService<B>,
    command: ShellCommand,
    out: &mut impl Write,
) -> Result<ShellFlow, CliError> {
    match command {
        ShellCommand::New { title, content } => {
            let options = AddOptions {
                title,
                ..AddOptions::default()
            };
            run_add(service, content, options, out).await?;
        }
        ShellCommand::Edit { id, content } => {
            run_edit(service, &id, None, content, out).await?;
        }
        ShellCommand::Pin(id) => {
            run_pin(service, &id, out).await?;
        }
        ShellCommand::Archive(id) => {
            run_archive(service, &id, out).await?;
        }
        ShellCommand::Color { id, color } => {
            run_color(service, &id, &color, out).await?;
        }
        ShellCommand::Remove(id) => run_delete(service, &id, out).await?,
        ShellCommand::Restore(id) => run_restore(service, &id, out).await?,
        ShellCommand::Purge(id) => run_purge(service, &id, out).await?,
        ShellCommand::PurgeExpired => run_purge_expired(service, out).await?,
        ShellCommand::Undo => {
            let message = if service.undo().await? {
                "Undone"
            } else {
                "Nothing to undo"
            };
            writeln!(out, "{message}")?;
        }
        ShellCommand::Redo => {
            let message = if service.redo().await? {
                "Redone"
            } else {
                "Nothing to redo"
            };
            writeln!(out, "{message}")?;
        }
        ShellCommand::List(scope) => run_list(service, scope, false, out).await?,
        ShellCommand::Find(query) => run_search(service, &query, false, out).await?,
        ShellCommand::Trash => run_trash(service, false, out).await?,
        ShellCommand::Help => writeln!(out, "{HELP}")?,
        ShellCommand::Quit => return Ok(ShellFlow::Quit),
    }

    Ok(ShellFlow::Continue)
}

pub async fn run_shell<B: NoteBackend>(service: &NoteService<B>) -> Result<(), CliError> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    writeln!(stdout, "kept shell - type 'help' for commands")?;

    loop {
        write!(stdout, "kept> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            writeln!(stdout)?;
            break;
        }

        let outcome = match parse_line(&line) {
            Ok(None) => continue,
            Ok(Some(command)) => execute(service, command, &mut stdout).await,
            Err(error) => Err(error),
        };

        match outcome {
            Ok(ShellFlow::Quit) => break,
            Ok(ShellFlow::Continue) => {}
            Err(error) => writeln!(stdout, "Error: {error}")?,
        }
    }

    Ok(())
}
