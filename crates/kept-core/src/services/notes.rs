//! Shared note service wrapper used across clients.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::backend::{AnyBackend, NoteBackend};
use crate::config::StoreConfig;
use crate::models::{Note, NoteColor, NoteDraft, NotePatch};
use crate::store::NoteStore;
use crate::{NoteId, Result};

/// Snapshot of the undo/redo cursor for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryState {
    pub index: isize,
    pub len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

/// Thread-safe handle to one note store.
///
/// Clones share the same store, and every call holds the lock for its whole
/// duration, so operations from concurrent callers never interleave.
pub struct NoteService<B> {
    store: Arc<Mutex<NoteStore<B>>>,
}

impl<B> Clone for NoteService<B> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl NoteService<AnyBackend> {
    /// Open the backend `config` selects and load its notes.
    pub async fn open(config: &StoreConfig) -> Result<Self> {
        let backend = AnyBackend::open(&config.backend, config.persist_timeout).await?;
        tracing::info!("Using {} note storage", backend.label());
        let store = NoteStore::open(backend, config).await?;
        Ok(Self::from_store(store))
    }
}

impl<B: NoteBackend> NoteService<B> {
    pub fn from_store(store: NoteStore<B>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
        }
    }

    pub async fn create(&self, draft: NoteDraft) -> Result<Note> {
        self.store.lock().await.create(draft).await
    }

    pub async fn update(&self, id: &NoteId, patch: NotePatch) -> Result<Note> {
        self.store.lock().await.update(id, patch).await
    }

    pub async fn toggle_pin(&self, id: &NoteId) -> Result<Note> {
        self.store.lock().await.toggle_pin(id).await
    }

    pub async fn toggle_archive(&self, id: &NoteId) -> Result<Note> {
        self.store.lock().await.toggle_archive(id).await
    }

    pub async fn set_color(&self, id: &NoteId, color: NoteColor) -> Result<Note> {
        self.store.lock().await.set_color(id, color).await
    }

    pub async fn delete(&self, id: &NoteId) -> Result<Note> {
        self.store.lock().await.delete(id).await
    }

    pub async fn restore(&self, id: &NoteId) -> Result<Note> {
        self.store.lock().await.restore(id).await
    }

    pub async fn purge(&self, id: &NoteId) -> Result<()> {
        self.store.lock().await.purge(id).await
    }

    pub async fn purge_expired(&self) -> Result<Vec<NoteId>> {
        self.store.lock().await.purge_expired().await
    }

    pub async fn undo(&self) -> Result<bool> {
        self.store.lock().await.undo().await
    }

    pub async fn redo(&self) -> Result<bool> {
        self.store.lock().await.redo().await
    }

    pub async fn reload(&self) -> Result<()> {
        self.store.lock().await.reload().await
    }

    pub async fn get(&self, id: &NoteId) -> Option<Note> {
        self.store.lock().await.get(id).cloned()
    }

    pub async fn list_active(&self) -> Vec<Note> {
        self.store.lock().await.list_active().to_vec()
    }

    pub async fn list_visible(&self) -> Vec<Note> {
        self.store
            .lock()
            .await
            .list_visible()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn list_archived(&self) -> Vec<Note> {
        self.store
            .lock()
            .await
            .list_archived()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn search(&self, query: &str) -> Vec<Note> {
        self.store
            .lock()
            .await
            .search(query)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn list_trash(&self) -> Result<Vec<Note>> {
        self.store.lock().await.list_trash().await
    }

    pub async fn trash_retention(&self) -> chrono::Duration {
        self.store.lock().await.trash_retention()
    }

    pub async fn history_state(&self) -> HistoryState {
        let store = self.store.lock().await;
        let history = store.history();
        HistoryState {
            index: history.history_index(),
            len: history.len(),
            can_undo: history.can_undo(),
            can_redo: history.can_redo(),
        }
    }
}
