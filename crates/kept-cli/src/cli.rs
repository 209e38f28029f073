use std::path::PathBuf;

use clap::{ArgGroup, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "kept")]
#[command(about = "Colorful sticky notes from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,

    /// Use the notes service at this URL instead of local storage
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Quick capture: kept "my note here"
    #[arg(trailing_var_arg = true)]
    pub note: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new note
    #[command(alias = "new")]
    Add {
        /// Note title
        #[arg(short, long)]
        title: Option<String>,
        /// Note color (default, red, orange, yellow, green, teal, blue, purple, pink)
        #[arg(short, long)]
        color: Option<String>,
        /// Pin the note
        #[arg(long)]
        pin: bool,
        /// Archive the note right away
        #[arg(long)]
        archive: bool,
        /// Note content
        content: Vec<String>,
    },
    /// List notes (pinned first)
    #[command(alias = "ls")]
    List {
        /// Show archived notes only
        #[arg(long, conflicts_with = "all")]
        archived: bool,
        /// Show archived and unarchived notes
        #[arg(long)]
        all: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search note titles and content
    Search {
        /// Search query
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing note (opens $EDITOR when no field is given)
    Edit {
        /// Note ID or unique ID prefix
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New content
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Toggle the pinned flag
    Pin {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Toggle the archived flag
    Archive {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Change a note's color
    Color {
        /// Note ID or unique ID prefix
        id: String,
        /// New color
        color: String,
    },
    /// Move a note to the trash
    #[command(alias = "rm")]
    Delete {
        /// Note ID or unique ID prefix
        id: String,
    },
    /// Restore a note from the trash
    Restore {
        /// Trashed note ID or unique ID prefix
        id: String,
    },
    /// List trashed notes
    Trash {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Permanently delete trashed notes
    #[command(group(ArgGroup::new("target").required(true).args(["id", "expired"])))]
    Purge {
        /// Trashed note ID or unique ID prefix
        id: Option<String>,
        /// Purge everything past the retention window
        #[arg(long)]
        expired: bool,
    },
    /// Interactive session with undo and redo
    Shell,
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: CompletionShell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}
