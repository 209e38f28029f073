//! The note store: canonical active collection plus undo/redo history.
//!
//! Every mutation is persisted through the backend first and only then
//! committed to memory and recorded in the [`HistoryLog`]. A failed or timed
//! out backend call therefore leaves the store exactly as it was.
//!
//! Undo and redo replay their inverse through the backend as well, so the
//! durable state never drifts from what the store reports.

mod history;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};

use crate::backend::NoteBackend;
use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::models::{Note, NoteColor, NoteDraft, NoteId, NotePatch};
use crate::search;

pub use history::{ActionKind, HistoryAction, HistoryLog};

/// Run a backend call under `limit`. Expiry counts as a persistence failure.
async fn persist<T>(limit: Duration, call: impl Future<Output = Result<T>>) -> Result<T> {
    tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
        tracing::warn!("Backend call timed out after {:?}", limit);
        Err(Error::Timeout(limit))
    })
}

/// Current time at the millisecond precision every backend can store.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Owns the active notes and keeps them in step with a backend.
pub struct NoteStore<B> {
    backend: B,
    notes: Vec<Note>,
    history: HistoryLog,
    persist_timeout: Duration,
    trash_retention: chrono::Duration,
}

impl<B: NoteBackend> NoteStore<B> {
    /// Build a store over `backend` and load its active collection.
    pub async fn open(backend: B, config: &StoreConfig) -> Result<Self> {
        let mut store = Self {
            backend,
            notes: Vec::new(),
            history: HistoryLog::new(config.history_limit),
            persist_timeout: config.persist_timeout,
            trash_retention: config.trash_retention,
        };
        store.notes = store.fetch_active().await?;
        tracing::info!("Loaded {} active notes", store.notes.len());
        Ok(store)
    }

    async fn fetch_active(&self) -> Result<Vec<Note>> {
        let mut notes = persist(self.persist_timeout, self.backend.load_active()).await?;
        let before = notes.len();
        notes.retain(|note| !note.is_deleted());
        if notes.len() != before {
            tracing::warn!(
                "Ignored {} deleted notes returned as active",
                before - notes.len()
            );
        }
        Ok(notes)
    }

    /// Re-read the active collection from the backend. History is kept.
    pub async fn reload(&mut self) -> Result<()> {
        self.notes = self.fetch_active().await?;
        Ok(())
    }

    pub const fn backend(&self) -> &B {
        &self.backend
    }

    pub const fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub const fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub const fn trash_retention(&self) -> chrono::Duration {
        self.trash_retention
    }

    fn position(&self, id: &NoteId) -> Result<usize> {
        self.notes
            .iter()
            .position(|note| &note.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Create a note at the front of the active collection.
    pub async fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        let note = Note::from_draft(NoteId::generate(), draft, now());
        let note = persist(self.persist_timeout, self.backend.insert(&note)).await?;

        tracing::debug!("Created note {}", note.id);
        self.notes.insert(0, note.clone());
        self.history.record(HistoryAction::Create { note: note.clone() });
        Ok(note)
    }

    /// Merge `patch` over an active note, keeping its position.
    pub async fn update(&mut self, id: &NoteId, patch: NotePatch) -> Result<Note> {
        let index = self.position(id)?;
        let previous = self.notes[index].clone();
        let mut note = previous.clone();
        patch.apply(&mut note);
        note.touch(now());

        persist(self.persist_timeout, self.backend.replace(&note)).await?;

        tracing::debug!("Updated note {}", id);
        self.notes[index] = note.clone();
        self.history.record(HistoryAction::Update {
            note: note.clone(),
            previous,
        });
        Ok(note)
    }

    pub async fn toggle_pin(&mut self, id: &NoteId) -> Result<Note> {
        let is_pinned = self.notes[self.position(id)?].is_pinned;
        self.update(id, NotePatch::pinned(!is_pinned)).await
    }

    pub async fn toggle_archive(&mut self, id: &NoteId) -> Result<Note> {
        let is_archived = self.notes[self.position(id)?].is_archived;
        self.update(id, NotePatch::archived(!is_archived)).await
    }

    pub async fn set_color(&mut self, id: &NoteId, color: NoteColor) -> Result<Note> {
        self.update(id, NotePatch::color(color)).await
    }

    /// Move an active note to the trash. Returns its pre-deletion snapshot.
    pub async fn delete(&mut self, id: &NoteId) -> Result<Note> {
        let index = self.position(id)?;
        let snapshot = self.notes[index].clone();

        persist(self.persist_timeout, self.backend.trash(id, now())).await?;

        tracing::debug!("Moved note {} to trash", id);
        self.notes.remove(index);
        self.history.record(HistoryAction::Delete {
            note: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Bring a trashed note back to the front of the active collection.
    ///
    /// Not recorded in history.
    pub async fn restore(&mut self, id: &NoteId) -> Result<Note> {
        let trash = persist(self.persist_timeout, self.backend.list_trash()).await?;
        let mut note = trash
            .into_iter()
            .find(|note| &note.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;

        persist(self.persist_timeout, self.backend.restore(id)).await?;

        tracing::debug!("Restored note {} from trash", id);
        note.deleted_at = None;
        self.put_front(note.clone());
        Ok(note)
    }

    /// Permanently delete one trashed note. Not undoable.
    pub async fn purge(&mut self, id: &NoteId) -> Result<()> {
        persist(self.persist_timeout, self.backend.purge(id)).await?;

        let forgotten = self.history.forget(id);
        tracing::debug!(
            "Purged note {} ({} history entries dropped)",
            id,
            forgotten
        );
        Ok(())
    }

    /// Permanently delete every note that has been in the trash longer than
    /// the retention window. Not undoable.
    pub async fn purge_expired(&mut self) -> Result<Vec<NoteId>> {
        self.purge_expired_at(Utc::now()).await
    }

    pub async fn purge_expired_at(&mut self, now: DateTime<Utc>) -> Result<Vec<NoteId>> {
        let cutoff = now - self.trash_retention;
        let purged = persist(self.persist_timeout, self.backend.purge_expired(cutoff)).await?;

        for id in &purged {
            self.history.forget(id);
        }
        tracing::info!("Purged {} expired notes from trash", purged.len());
        Ok(purged)
    }

    // ---------------------------------------------------------------------
    // Undo / redo
    // ---------------------------------------------------------------------

    /// Reverse the action at the cursor. Returns `false` when there is
    /// nothing to undo.
    pub async fn undo(&mut self) -> Result<bool> {
        let Some(action) = self.history.next_undo().cloned() else {
            return Ok(false);
        };

        match &action {
            HistoryAction::Create { note } => {
                self.replay_trash(&note.id, "Undo of create").await?;
                self.remove_active(&note.id);
            }
            HistoryAction::Delete { note } => {
                self.replay_restore(&note.id, "Undo of delete").await?;
                self.put_front(note.clone());
            }
            HistoryAction::Update { previous, .. } => {
                persist(self.persist_timeout, self.backend.replace(previous)).await?;
                self.put_in_place(previous.clone());
            }
        }

        tracing::debug!("Undid {:?} of note {}", action.kind(), action.note_id());
        self.history.step_back();
        Ok(true)
    }

    /// Re-apply the action after the cursor. Returns `false` when there is
    /// nothing to redo.
    pub async fn redo(&mut self) -> Result<bool> {
        let Some(action) = self.history.next_redo().cloned() else {
            return Ok(false);
        };

        match &action {
            HistoryAction::Create { note } => {
                self.replay_restore(&note.id, "Redo of create").await?;
                self.put_front(note.clone());
            }
            HistoryAction::Delete { note } => {
                self.replay_trash(&note.id, "Redo of delete").await?;
                self.remove_active(&note.id);
            }
            HistoryAction::Update { note, .. } => {
                persist(self.persist_timeout, self.backend.replace(note)).await?;
                self.put_in_place(note.clone());
            }
        }

        tracing::debug!("Redid {:?} of note {}", action.kind(), action.note_id());
        self.history.step_forward();
        Ok(true)
    }

    /// Whether the backend currently lists `id` as active.
    async fn backend_has_active(&self, id: &NoteId) -> Result<bool> {
        let active = persist(self.persist_timeout, self.backend.load_active()).await?;
        Ok(active.iter().any(|note| &note.id == id))
    }

    /// Restore `id` during a replay. A missing trash entry is accepted only
    /// when the note is already active in the backend.
    async fn replay_restore(&self, id: &NoteId, step: &str) -> Result<()> {
        match persist(self.persist_timeout, self.backend.restore(id)).await {
            Err(Error::NotFound(_)) if self.backend_has_active(id).await? => {
                tracing::warn!("{} found note {} already active", step, id);
                Ok(())
            }
            other => other,
        }
    }

    /// Trash `id` during a replay. A missing active entry is accepted only
    /// when the note is already trashed or gone from the backend.
    async fn replay_trash(&self, id: &NoteId, step: &str) -> Result<()> {
        match persist(self.persist_timeout, self.backend.trash(id, now())).await {
            Err(Error::NotFound(_)) if !self.backend_has_active(id).await? => {
                tracing::warn!("{} found note {} already inactive", step, id);
                Ok(())
            }
            other => other,
        }
    }

    fn remove_active(&mut self, id: &NoteId) {
        self.notes.retain(|note| &note.id != id);
    }

    fn put_front(&mut self, mut note: Note) {
        note.deleted_at = None;
        self.remove_active(&note.id);
        self.notes.insert(0, note);
    }

    fn put_in_place(&mut self, note: Note) {
        match self.notes.iter_mut().find(|existing| existing.id == note.id) {
            Some(slot) => *slot = note,
            None => self.put_front(note),
        }
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// All active notes, most recent first.
    pub fn list_active(&self) -> &[Note] {
        &self.notes
    }

    /// Active notes shown in the main grid (not archived).
    pub fn list_visible(&self) -> Vec<&Note> {
        self.notes.iter().filter(|note| !note.is_archived).collect()
    }

    pub fn list_archived(&self) -> Vec<&Note> {
        self.notes.iter().filter(|note| note.is_archived).collect()
    }

    /// Active notes (archived included) whose title or content contains `query`.
    pub fn search(&self, query: &str) -> Vec<&Note> {
        search::filter_notes(&self.notes, query)
    }

    /// Trashed notes, most recently deleted first.
    pub async fn list_trash(&self) -> Result<Vec<Note>> {
        let mut trash = persist(self.persist_timeout, self.backend.list_trash()).await?;
        search::sort_trash(&mut trash);
        Ok(trash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    async fn store() -> (NoteStore<MemoryBackend>, MemoryBackend) {
        let backend = MemoryBackend::new();
        let store = NoteStore::open(backend.clone(), &StoreConfig::in_memory())
            .await
            .unwrap();
        (store, backend)
    }

    fn ids(notes: &[Note]) -> Vec<String> {
        notes.iter().map(|note| note.id.to_string()).collect()
    }

    fn assert_no_deleted(store: &NoteStore<MemoryBackend>) {
        assert!(store.list_active().iter().all(|note| note.deleted_at.is_none()));
    }

    #[tokio::test]
    async fn test_create_inserts_at_front_and_persists() {
        let (mut store, backend) = store().await;

        let first = store.create(NoteDraft::new("first", "")).await.unwrap();
        let second = store.create(NoteDraft::new("second", "")).await.unwrap();

        assert_eq!(
            ids(store.list_active()),
            vec![second.id.to_string(), first.id.to_string()]
        );
        assert_eq!(backend.snapshot().0, store.list_active().to_vec());
        assert_eq!(first.created_at, first.updated_at);
        assert_eq!(first.created_at.timestamp_subsec_nanos() % 1_000_000, 0);
        assert_eq!(store.history().len(), 2);
    }

    #[tokio::test]
    async fn test_create_failure_changes_nothing() {
        let (mut store, backend) = store().await;
        store.create(NoteDraft::new("kept", "")).await.unwrap();
        let before = store.list_active().to_vec();

        backend.fail_next(1);
        let error = store.create(NoteDraft::new("lost", "")).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Persistence);
        assert_eq!(store.list_active(), before.as_slice());
        assert_eq!(store.history().len(), 1);
        assert_eq!(backend.snapshot().0, before);
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_position() {
        let (mut store, _backend) = store().await;
        let a = store.create(NoteDraft::new("a", "one")).await.unwrap();
        let b = store.create(NoteDraft::new("b", "two")).await.unwrap();

        let updated = store
            .update(&a.id, NotePatch::text("a2", "one more"))
            .await
            .unwrap();

        assert_eq!(updated.title, "a2");
        assert!(updated.updated_at >= a.updated_at);
        assert_eq!(updated.created_at, a.created_at);
        assert_eq!(
            ids(store.list_active()),
            vec![b.id.to_string(), a.id.to_string()]
        );
    }

    #[tokio::test]
    async fn test_update_missing_note_is_not_found() {
        let (mut store, backend) = store().await;
        let error = store
            .update(&NoteId::from("ghost"), NotePatch::color(NoteColor::Red))
            .await
            .unwrap_err();

        assert!(error.is_not_found());
        assert_eq!(backend.write_count(), 0);
        assert!(!store.can_undo());
    }

    #[tokio::test]
    async fn test_update_failure_rolls_back() {
        let (mut store, backend) = store().await;
        let note = store.create(NoteDraft::new("stable", "")).await.unwrap();

        backend.set_offline(true);
        assert!(store.set_color(&note.id, NoteColor::Teal).await.is_err());
        backend.set_offline(false);

        assert_eq!(store.get(&note.id), Some(&note));
        assert_eq!(store.history().len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_a_persistence_failure() {
        let backend = MemoryBackend::new();
        let config = StoreConfig {
            persist_timeout: Duration::from_millis(50),
            ..StoreConfig::in_memory()
        };
        let mut store = NoteStore::open(backend.clone(), &config).await.unwrap();

        backend.set_latency(Some(Duration::from_millis(500)));
        let error = store.create(NoteDraft::new("slow", "")).await.unwrap_err();

        assert!(matches!(error, Error::Timeout(_)));
        assert_eq!(error.kind(), ErrorKind::Persistence);
        assert!(store.list_active().is_empty());
        assert!(!store.can_undo());

        backend.set_latency(None);
        assert!(backend.snapshot().0.is_empty());
    }

    #[tokio::test]
    async fn test_toggle_pin_flips_flag_without_reordering() {
        let (mut store, _backend) = store().await;
        let pinned = store
            .create(NoteDraft::new("pinned", "").pinned(true))
            .await
            .unwrap();
        let plain = store.create(NoteDraft::new("plain", "")).await.unwrap();
        let order = ids(store.list_active());

        let toggled = store.toggle_pin(&plain.id).await.unwrap();

        assert!(toggled.is_pinned);
        assert!(toggled.updated_at >= plain.updated_at);
        assert_eq!(ids(store.list_active()), order);

        let (first, rest) = search::partition_pinned(store.list_active());
        assert_eq!(first.len(), 2);
        assert!(rest.is_empty());

        store.toggle_pin(&pinned.id).await.unwrap();
        let (first, rest) = search::partition_pinned(store.list_active());
        assert_eq!(first[0].id, plain.id);
        assert_eq!(rest[0].id, pinned.id);
    }

    #[tokio::test]
    async fn test_archive_moves_note_out_of_visible_list() {
        let (mut store, _backend) = store().await;
        let note = store.create(NoteDraft::new("old", "")).await.unwrap();

        store.toggle_archive(&note.id).await.unwrap();

        assert!(store.list_visible().is_empty());
        assert_eq!(store.list_archived().len(), 1);
        assert_eq!(store.search("old").len(), 1);
    }

    #[tokio::test]
    async fn test_delete_moves_to_trash() {
        let (mut store, backend) = store().await;
        let note = store.create(NoteDraft::new("bye", "")).await.unwrap();

        let snapshot = store.delete(&note.id).await.unwrap();

        assert_eq!(snapshot, note);
        assert!(store.list_active().is_empty());
        let trash = store.list_trash().await.unwrap();
        assert_eq!(trash.len(), 1);
        assert!(trash[0].deleted_at.is_some());
        assert_eq!(backend.snapshot().1.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_not_in_trash_is_not_found() {
        let (mut store, _backend) = store().await;
        let note = store.create(NoteDraft::new("active", "")).await.unwrap();
        let before = store.list_active().to_vec();

        let error = store.restore(&note.id).await.unwrap_err();

        assert!(error.is_not_found());
        assert_eq!(store.list_active(), before.as_slice());
    }

    #[tokio::test]
    async fn test_restore_keeps_id_and_is_not_undoable() {
        let (mut store, _backend) = store().await;
        let note = store.create(NoteDraft::new("back", "")).await.unwrap();
        store.delete(&note.id).await.unwrap();
        let history_len = store.history().len();

        let restored = store.restore(&note.id).await.unwrap();

        assert_eq!(restored.id, note.id);
        assert!(restored.deleted_at.is_none());
        assert_eq!(store.list_active()[0].id, note.id);
        assert!(store.list_trash().await.unwrap().is_empty());
        assert_eq!(store.history().len(), history_len);
        assert_no_deleted(&store);
    }

    #[tokio::test]
    async fn test_restore_after_outside_trash_keeps_one_copy() {
        let (mut store, backend) = store().await;
        let note = store.create(NoteDraft::new("shared", "")).await.unwrap();
        store.create(NoteDraft::new("other", "")).await.unwrap();

        // Another client trashed the note; this store still lists it
        backend.trash(&note.id, Utc::now()).await.unwrap();
        store.restore(&note.id).await.unwrap();

        let matching = store
            .list_active()
            .iter()
            .filter(|active| active.id == note.id)
            .count();
        assert_eq!(matching, 1);
        assert_eq!(store.list_active()[0].id, note.id);
        assert_eq!(store.list_active().len(), 2);
    }

    #[tokio::test]
    async fn test_create_then_undo_restores_exact_state() {
        let (mut store, backend) = store().await;
        store.create(NoteDraft::new("a", "")).await.unwrap();
        store.create(NoteDraft::new("b", "")).await.unwrap();
        let before = store.list_active().to_vec();

        store.create(NoteDraft::new("c", "")).await.unwrap();
        assert!(store.undo().await.unwrap());

        assert_eq!(store.list_active(), before.as_slice());
        assert_eq!(backend.snapshot().0, before);
    }

    #[tokio::test]
    async fn test_delete_undo_redo_round_trip() {
        let (mut store, backend) = store().await;
        store.create(NoteDraft::new("a", "")).await.unwrap();
        let b = store.create(NoteDraft::new("b", "")).await.unwrap();
        store.create(NoteDraft::new("c", "")).await.unwrap();

        store.delete(&b.id).await.unwrap();
        let after_delete = store.list_active().to_vec();

        assert!(store.undo().await.unwrap());
        assert!(store.get(&b.id).is_some());
        assert!(store.redo().await.unwrap());

        assert_eq!(store.list_active(), after_delete.as_slice());
        assert_eq!(backend.snapshot().0, after_delete);
        assert_no_deleted(&store);
    }

    #[tokio::test]
    async fn test_groceries_scenario() {
        let (mut store, backend) = store().await;
        let a = store
            .create(NoteDraft::new("Groceries", "Milk, eggs"))
            .await
            .unwrap();
        store.set_color(&a.id, NoteColor::Blue).await.unwrap();
        store.delete(&a.id).await.unwrap();
        assert!(store.list_active().is_empty());

        store.undo().await.unwrap();
        assert_eq!(store.get(&a.id).unwrap().color, NoteColor::Blue);

        store.undo().await.unwrap();
        assert_eq!(store.get(&a.id).unwrap().color, NoteColor::Default);
        assert_eq!(backend.snapshot().0[0].color, NoteColor::Default);

        store.undo().await.unwrap();
        assert!(store.get(&a.id).is_none());
        assert!(!store.can_undo());
        assert!(backend.snapshot().0.is_empty());

        // Nothing left: further undo is a no-op
        assert!(!store.undo().await.unwrap());
    }

    #[tokio::test]
    async fn test_redo_create_reuses_id() {
        let (mut store, _backend) = store().await;
        let note = store.create(NoteDraft::new("again", "")).await.unwrap();

        store.undo().await.unwrap();
        store.redo().await.unwrap();

        assert_eq!(store.list_active()[0].id, note.id);
        assert!(store.list_trash().await.unwrap().is_empty());
        assert!(!store.can_redo());
    }

    #[tokio::test]
    async fn test_failed_undo_keeps_cursor() {
        let (mut store, backend) = store().await;
        let note = store.create(NoteDraft::new("x", "")).await.unwrap();
        store.set_color(&note.id, NoteColor::Pink).await.unwrap();
        let index = store.history().history_index();

        backend.fail_next(1);
        assert!(store.undo().await.is_err());

        assert_eq!(store.history().history_index(), index);
        assert_eq!(store.get(&note.id).unwrap().color, NoteColor::Pink);
    }

    #[tokio::test]
    async fn test_undo_delete_of_purged_note_fails() {
        let (mut store, backend) = store().await;
        let note = store.create(NoteDraft::new("a", "")).await.unwrap();
        store.delete(&note.id).await.unwrap();
        let index = store.history().history_index();

        // Purged elsewhere: nothing left to bring back
        backend.purge(&note.id).await.unwrap();

        let error = store.undo().await.unwrap_err();
        assert!(error.is_not_found());
        assert!(store.list_active().is_empty());
        assert_eq!(store.history().history_index(), index);
        assert!(store.can_undo());
    }

    #[tokio::test]
    async fn test_undo_delete_accepts_note_already_restored() {
        let (mut store, backend) = store().await;
        let note = store.create(NoteDraft::new("a", "")).await.unwrap();
        store.delete(&note.id).await.unwrap();

        backend.restore(&note.id).await.unwrap();

        assert!(store.undo().await.unwrap());
        assert_eq!(ids(store.list_active()), vec![note.id.to_string()]);
        assert_eq!(backend.snapshot().0, store.list_active().to_vec());
    }

    #[tokio::test]
    async fn test_redo_delete_accepts_note_already_gone() {
        let (mut store, backend) = store().await;
        let note = store.create(NoteDraft::new("a", "")).await.unwrap();
        store.delete(&note.id).await.unwrap();
        store.undo().await.unwrap();

        // Trashed and purged elsewhere before the redo
        backend.trash(&note.id, Utc::now()).await.unwrap();
        backend.purge(&note.id).await.unwrap();

        assert!(store.redo().await.unwrap());
        assert!(store.list_active().is_empty());
        assert!(!store.can_redo());
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let (mut store, _backend) = store().await;
        for i in 0..60 {
            store.create(NoteDraft::new(i.to_string(), "")).await.unwrap();
        }

        assert_eq!(store.history().len(), 50);

        let mut undone = 0;
        while store.undo().await.unwrap() {
            undone += 1;
        }
        assert_eq!(undone, 50);
        // The ten oldest creations stay
        assert_eq!(store.list_active().len(), 10);
        assert_eq!(store.list_active()[0].title, "9");
    }

    #[tokio::test]
    async fn test_new_action_discards_redo_branch() {
        let (mut store, _backend) = store().await;
        store.create(NoteDraft::new("a", "")).await.unwrap();
        store.create(NoteDraft::new("b", "")).await.unwrap();
        store.undo().await.unwrap();
        assert!(store.can_redo());

        store.create(NoteDraft::new("c", "")).await.unwrap();

        assert!(!store.can_redo());
        assert!(!store.redo().await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_recent_trash() {
        let now = Utc::now();
        let mut recent = Note::from_draft(NoteId::from("recent"), NoteDraft::new("r", ""), now);
        recent.deleted_at = Some(now - chrono::Duration::days(3));
        let mut stale = Note::from_draft(NoteId::from("stale"), NoteDraft::new("s", ""), now);
        stale.deleted_at = Some(now - chrono::Duration::days(8));

        let backend = MemoryBackend::with_notes(Vec::new(), vec![recent, stale]);
        let mut store = NoteStore::open(backend, &StoreConfig::in_memory())
            .await
            .unwrap();

        let purged = store.purge_expired_at(now).await.unwrap();

        assert_eq!(purged, vec![NoteId::from("stale")]);
        assert_eq!(ids(&store.list_trash().await.unwrap()), vec!["recent"]);
    }

    #[tokio::test]
    async fn test_purge_forgets_history() {
        let (mut store, _backend) = store().await;
        let keep = store.create(NoteDraft::new("keep", "")).await.unwrap();
        let gone = store.create(NoteDraft::new("gone", "")).await.unwrap();
        store.delete(&gone.id).await.unwrap();

        store.purge(&gone.id).await.unwrap();

        assert_eq!(store.history().len(), 1);
        assert!(store.list_trash().await.unwrap().is_empty());
        assert!(store.undo().await.unwrap());
        assert!(store.get(&keep.id).is_none());
    }

    #[tokio::test]
    async fn test_purge_active_note_is_not_found() {
        let (mut store, _backend) = store().await;
        let note = store.create(NoteDraft::new("live", "")).await.unwrap();

        assert!(store.purge(&note.id).await.unwrap_err().is_not_found());
        assert!(store.get(&note.id).is_some());
    }

    #[tokio::test]
    async fn test_reload_drops_notes_marked_deleted() {
        let now = Utc::now();
        let mut odd = Note::from_draft(NoteId::from("odd"), NoteDraft::default(), now);
        odd.deleted_at = Some(now);
        let fine = Note::from_draft(NoteId::from("fine"), NoteDraft::default(), now);

        let backend = MemoryBackend::with_notes(vec![odd, fine], Vec::new());
        let store = NoteStore::open(backend, &StoreConfig::in_memory())
            .await
            .unwrap();

        assert_eq!(ids(store.list_active()), vec!["fine"]);
    }

    #[tokio::test]
    async fn test_active_never_contains_deleted_notes() {
        let (mut store, _backend) = store().await;
        let a = store.create(NoteDraft::new("a", "")).await.unwrap();
        assert_no_deleted(&store);
        let b = store.create(NoteDraft::new("b", "")).await.unwrap();
        store.update(&a.id, NotePatch::pinned(true)).await.unwrap();
        assert_no_deleted(&store);
        store.delete(&b.id).await.unwrap();
        assert_no_deleted(&store);
        store.undo().await.unwrap();
        assert_no_deleted(&store);
        store.delete(&a.id).await.unwrap();
        assert_no_deleted(&store);
    }
}
