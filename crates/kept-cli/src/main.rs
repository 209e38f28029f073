//! Kept CLI - colorful sticky notes from the terminal
//!
//! Quick capture, listing, trash management and an interactive shell with
//! undo and redo.

mod cli;
mod commands;
mod error;

use std::env;
use std::io::{self, Write};

use clap::{CommandFactory, Parser};
use kept_core::NoteService;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::{run_add, AddOptions};
use crate::commands::common::{read_piped_stdin, resolve_note_content, resolve_store_config};
use crate::commands::completions::run_completions;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::flags::{run_archive, run_color, run_pin};
use crate::commands::list::{run_list, ListScope};
use crate::commands::purge::{run_purge, run_purge_expired};
use crate::commands::restore::run_restore;
use crate::commands::search::run_search;
use crate::commands::shell::run_shell;
use crate::commands::trash::run_trash;
use crate::error::CliError;


#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn init_tracing() -> Result<(), CliError> {
    let directive = |value: &str| {
        value
            .parse()
            .map_err(|error| CliError::Logging(format!("{value}: {error}")))
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(directive("kept=info")?)
                .add_directive(directive("kept_core=warn")?),
        )
        .with_writer(io::stderr)
        .init();
    Ok(())
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if let Some(Commands::Completions { shell, output }) = &cli.command {
        return run_completions(*shell, output.as_deref(), &mut out);
    }

    let config = resolve_store_config(|name| env::var(name).ok(), cli.db_path, cli.api_url)?;
    let service = NoteService::open(&config).await?;

    match cli.command {
        Some(Commands::Add {
            title,
            color,
            pin,
            archive,
            content,
        }) => {
            let content = if title.is_some() && content.is_empty() {
                read_piped_stdin()?
            } else {
                resolve_note_content(&content)?
            };
            let options = AddOptions {
                title,
                color,
                pin,
                archive,
            };
            run_add(&service, content, options, &mut out).await?;
        }
        Some(Commands::List {
            archived,
            all,
            json,
        }) => {
            let scope = if archived {
                ListScope::Archived
            } else if all {
                ListScope::All
            } else {
                ListScope::Visible
            };
            run_list(&service, scope, json, &mut out).await?;
        }
        Some(Commands::Search { query, json }) => {
            run_search(&service, &query, json, &mut out).await?;
        }
        Some(Commands::Edit { id, title, content }) => {
            run_edit(&service, &id, title, content, &mut out).await?;
        }
        Some(Commands::Pin { id }) => {
            run_pin(&service, &id, &mut out).await?;
        }
        Some(Commands::Archive { id }) => {
            run_archive(&service, &id, &mut out).await?;
        }
        Some(Commands::Color { id, color }) => {
            run_color(&service, &id, &color, &mut out).await?;
        }
        Some(Commands::Delete { id }) => run_delete(&service, &id, &mut out).await?,
        Some(Commands::Restore { id }) => run_restore(&service, &id, &mut out).await?,
        Some(Commands::Trash { json }) => run_trash(&service, json, &mut out).await?,
        Some(Commands::Purge { id, .. }) => match id {
            Some(id) => run_purge(&service, &id, &mut out).await?,
            None => run_purge_expired(&service, &mut out).await?,
        },
        Some(Commands::Shell) => {
            drop(out);
            run_shell(&service).await?;
        }
        Some(Commands::Completions { .. }) => {}
        None => {
            // Quick capture mode: kept "my note"
            if cli.note.is_empty() {
                Cli::command().print_help()?;
                writeln!(out)?;
            } else {
                let content = resolve_note_content(&cli.note)?;
                run_add(&service, content, AddOptions::default(), &mut out).await?;
            }
        }
    }

    Ok(())
}
