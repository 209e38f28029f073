//! Durable local backend: whole collections serialized under fixed keys.

use std::path::Path;

use chrono::{DateTime, Utc};

use super::collections::Collections;
use super::NoteBackend;
use crate::db::{Database, KeyValueRepository, LibSqlKeyValueRepository};
use crate::error::Result;
use crate::models::{Note, NoteId};

/// Key holding the serialized active collection
pub const NOTES_KEY: &str = "kept-notes";
/// Key holding the serialized trash collection
pub const TRASH_KEY: &str = "kept-trash";

/// Key-value persistence in a local libSQL database.
///
/// There are no partial updates: every change rewrites both collections in
/// one transaction.
pub struct LocalBackend {
    db: Database,
}

impl LocalBackend {
    /// Open (or create) the database file at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::info!("Opening local note storage at {}", path.display());
        Ok(Self {
            db: Database::open(path).await?,
        })
    }

    pub async fn open_in_memory() -> Result<Self> {
        Ok(Self {
            db: Database::open_in_memory().await?,
        })
    }

    /// Wrap an already opened database.
    pub const fn from_database(db: Database) -> Self {
        Self { db }
    }

    fn repo(&self) -> LibSqlKeyValueRepository<'_> {
        LibSqlKeyValueRepository::new(self.db.connection())
    }

    /// Read one collection. Corrupt data is logged and read as empty.
    async fn read_collection(&self, key: &str) -> Result<Vec<Note>> {
        let Some(raw) = self.repo().get(key).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<Note>>(&raw) {
            Ok(notes) => Ok(notes),
            Err(error) => {
                tracing::warn!(
                    "Stored collection '{}' is unreadable ({}); starting from an empty collection",
                    key,
                    error
                );
                Ok(Vec::new())
            }
        }
    }

    async fn read(&self) -> Result<Collections> {
        Ok(Collections {
            active: self.read_collection(NOTES_KEY).await?,
            trash: self.read_collection(TRASH_KEY).await?,
        })
    }

    async fn write(&self, collections: &Collections) -> Result<()> {
        let active = serde_json::to_string(&collections.active)?;
        let trash = serde_json::to_string(&collections.trash)?;
        self.repo()
            .put_many(&[(NOTES_KEY, active.as_str()), (TRASH_KEY, trash.as_str())])
            .await
    }

    /// Read both collections, apply `change`, and write them back.
    async fn modify<T>(&self, change: impl FnOnce(&mut Collections) -> Result<T>) -> Result<T> {
        let mut collections = self.read().await?;
        let value = change(&mut collections)?;
        self.write(&collections).await?;
        Ok(value)
    }
}

impl NoteBackend for LocalBackend {
    async fn load_active(&self) -> Result<Vec<Note>> {
        let notes = self.read_collection(NOTES_KEY).await?;
        tracing::debug!("Loaded {} notes from local storage", notes.len());
        Ok(notes)
    }

    async fn insert(&self, note: &Note) -> Result<Note> {
        self.modify(|collections| collections.insert(note)).await
    }

    async fn replace(&self, note: &Note) -> Result<()> {
        self.modify(|collections| collections.replace(note)).await
    }

    async fn trash(&self, id: &NoteId, deleted_at: DateTime<Utc>) -> Result<()> {
        self.modify(|collections| collections.trash(id, deleted_at))
            .await
    }

    async fn list_trash(&self) -> Result<Vec<Note>> {
        self.read_collection(TRASH_KEY).await
    }

    async fn restore(&self, id: &NoteId) -> Result<()> {
        self.modify(|collections| collections.restore(id)).await
    }

    async fn purge(&self, id: &NoteId) -> Result<()> {
        self.modify(|collections| collections.purge(id)).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<NoteId>> {
        self.modify(|collections| Ok(collections.purge_expired(cutoff)))
            .await
    }
}
