//! In-process backend with failure injection.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::collections::Collections;
use super::NoteBackend;
use crate::error::{Error, Result};
use crate::models::{Note, NoteId};

#[derive(Debug, Default)]
struct MemoryState {
    collections: Collections,
    fail_next: usize,
    offline: bool,
    latency: Option<Duration>,
    writes: usize,
}

/// Backend that keeps both partitions in process memory.
///
/// Clones share state, so a test can hand one clone to a store and keep
/// another to inject failures or inspect what was persisted.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend with existing active and trashed notes.
    pub fn with_notes(active: Vec<Note>, trash: Vec<Note>) -> Self {
        let backend = Self::default();
        backend.lock().collections = Collections { active, trash };
        backend
    }

    /// Make the next `count` calls fail with a persistence error.
    pub fn fail_next(&self, count: usize) {
        self.lock().fail_next = count;
    }

    /// Fail every call until switched back on.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Delay every call, e.g. to exercise persistence timeouts.
    pub fn set_latency(&self, latency: Option<Duration>) {
        self.lock().latency = latency;
    }

    /// Copy of the persisted `(active, trash)` partitions.
    pub fn snapshot(&self) -> (Vec<Note>, Vec<Note>) {
        let state = self.lock();
        (
            state.collections.active.clone(),
            state.collections.trash.clone(),
        )
    }

    /// Number of successful mutating calls so far.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Simulated latency and injected failures, applied before every call.
    async fn gate(&self) -> Result<()> {
        let latency = self.lock().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        if state.offline {
            return Err(Error::Persistence("memory backend is offline".to_string()));
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(Error::Persistence("injected failure".to_string()));
        }
        Ok(())
    }

    async fn write<T>(&self, apply: impl FnOnce(&mut Collections) -> Result<T>) -> Result<T> {
        self.gate().await?;
        let mut state = self.lock();
        let value = apply(&mut state.collections)?;
        state.writes += 1;
        Ok(value)
    }
}

impl NoteBackend for MemoryBackend {
    async fn load_active(&self) -> Result<Vec<Note>> {
        self.gate().await?;
        Ok(self.lock().collections.active.clone())
    }

    async fn insert(&self, note: &Note) -> Result<Note> {
        self.write(|collections| collections.insert(note)).await
    }

    async fn replace(&self, note: &Note) -> Result<()> {
        self.write(|collections| collections.replace(note)).await
    }

    async fn trash(&self, id: &NoteId, deleted_at: DateTime<Utc>) -> Result<()> {
        self.write(|collections| collections.trash(id, deleted_at))
            .await
    }

    async fn list_trash(&self) -> Result<Vec<Note>> {
        self.gate().await?;
        Ok(self.lock().collections.trash.clone())
    }

    async fn restore(&self, id: &NoteId) -> Result<()> {
        self.write(|collections| collections.restore(id)).await
    }

    async fn purge(&self, id: &NoteId) -> Result<()> {
        self.write(|collections| collections.purge(id)).await
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<NoteId>> {
        self.write(|collections| Ok(collections.purge_expired(cutoff)))
            .await
    }
}
