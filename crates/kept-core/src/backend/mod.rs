//! Backing collaborators a [`NoteStore`](crate::store::NoteStore) persists through.
//!
//! Every backend keeps two logical partitions, the active collection and the
//! trash, and exposes the same operations whether it is a local key-value
//! database, the remote notes service, or plain memory.

mod collections;
mod local;
mod memory;
mod remote;

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::BackendConfig;
use crate::error::Result;
use crate::models::{Note, NoteId};

pub use local::{LocalBackend, NOTES_KEY, TRASH_KEY};
pub use memory::MemoryBackend;
pub use remote::RemoteBackend;

/// Persistence operations required by the note store (async)
#[allow(async_fn_in_trait)]
pub trait NoteBackend {
    /// Load the active collection in display order
    async fn load_active(&self) -> Result<Vec<Note>>;

    /// Persist a new note at the front of the active collection.
    ///
    /// Returns the note as stored. Its id and timestamps may differ from
    /// `note` when the backend assigns its own.
    async fn insert(&self, note: &Note) -> Result<Note>;

    /// Overwrite an active note. Idempotent.
    async fn replace(&self, note: &Note) -> Result<()>;

    /// Move an active note to the trash
    async fn trash(&self, id: &NoteId, deleted_at: DateTime<Utc>) -> Result<()>;

    /// All trashed notes, most recently deleted first
    async fn list_trash(&self) -> Result<Vec<Note>>;

    /// Move a trashed note back to the front of the active collection
    async fn restore(&self, id: &NoteId) -> Result<()>;

    /// Irreversibly delete one trashed note
    async fn purge(&self, id: &NoteId) -> Result<()>;

    /// Irreversibly delete every trashed note deleted before `cutoff`
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<NoteId>>;
}

/// Backend chosen from configuration when the store is constructed.
pub enum AnyBackend {
    Local(LocalBackend),
    Remote(RemoteBackend),
    Memory(MemoryBackend),
}

impl AnyBackend {
    /// Open the backend `config` describes. `timeout` bounds remote requests.
    pub async fn open(config: &BackendConfig, timeout: Duration) -> Result<Self> {
        let backend = match config {
            BackendConfig::Local { db_path } => Self::Local(LocalBackend::open(db_path).await?),
            BackendConfig::Remote { base_url } => {
                tracing::info!("Using remote notes service at {}", base_url);
                Self::Remote(RemoteBackend::new(base_url.clone(), timeout)?)
            }
            BackendConfig::Memory => {
                tracing::info!("Running with in-memory storage; notes will not be saved");
                Self::Memory(MemoryBackend::new())
            }
        };
        Ok(backend)
    }

    pub const fn label(&self) -> &'static str {
        match self {
            Self::Local(_) => "local",
            Self::Remote(_) => "remote",
            Self::Memory(_) => "memory",
        }
    }
}

impl NoteBackend for AnyBackend {
    async fn load_active(&self) -> Result<Vec<Note>> {
        match self {
            Self::Local(backend) => backend.load_active().await,
            Self::Remote(backend) => backend.load_active().await,
            Self::Memory(backend) => backend.load_active().await,
        }
    }

    async fn insert(&self, note: &Note) -> Result<Note> {
        match self {
            Self::Local(backend) => backend.insert(note).await,
            Self::Remote(backend) => backend.insert(note).await,
            Self::Memory(backend) => backend.insert(note).await,
        }
    }

    async fn replace(&self, note: &Note) -> Result<()> {
        match self {
            Self::Local(backend) => backend.replace(note).await,
            Self::Remote(backend) => backend.replace(note).await,
            Self::Memory(backend) => backend.replace(note).await,
        }
    }

    async fn trash(&self, id: &NoteId, deleted_at: DateTime<Utc>) -> Result<()> {
        match self {
            Self::Local(backend) => backend.trash(id, deleted_at).await,
            Self::Remote(backend) => backend.trash(id, deleted_at).await,
            Self::Memory(backend) => backend.trash(id, deleted_at).await,
        }
    }

    async fn list_trash(&self) -> Result<Vec<Note>> {
        match self {
            Self::Local(backend) => backend.list_trash().await,
            Self::Remote(backend) => backend.list_trash().await,
            Self::Memory(backend) => backend.list_trash().await,
        }
    }

    async fn restore(&self, id: &NoteId) -> Result<()> {
        match self {
            Self::Local(backend) => backend.restore(id).await,
            Self::Remote(backend) => backend.restore(id).await,
            Self::Memory(backend) => backend.restore(id).await,
        }
    }

    async fn purge(&self, id: &NoteId) -> Result<()> {
        match self {
            Self::Local(backend) => backend.purge(id).await,
            Self::Remote(backend) => backend.purge(id).await,
            Self::Memory(backend) => backend.purge(id).await,
        }
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<NoteId>> {
        match self {
            Self::Local(backend) => backend.purge_expired(cutoff).await,
            Self::Remote(backend) => backend.purge_expired(cutoff).await,
            Self::Memory(backend) => backend.purge_expired(cutoff).await,
        }
    }
}
