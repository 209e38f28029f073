//! Active/trash collection pair shared by the whole-collection backends.

use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::{Note, NoteId};

/// The two partitions a whole-collection backend keeps.
///
/// Both vectors are ordered most-recent-first: new and restored notes go to
/// the front of `active`, freshly trashed notes to the front of `trash`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Collections {
    pub active: Vec<Note>,
    pub trash: Vec<Note>,
}

impl Collections {
    fn contains(&self, id: &NoteId) -> bool {
        self.active.iter().chain(&self.trash).any(|note| &note.id == id)
    }

    fn take(notes: &mut Vec<Note>, id: &NoteId) -> Result<Note> {
        let index = notes
            .iter()
            .position(|note| &note.id == id)
            .ok_or_else(|| Error::NotFound(id.clone()))?;
        Ok(notes.remove(index))
    }

    pub fn insert(&mut self, note: &Note) -> Result<Note> {
        if self.contains(&note.id) {
            return Err(Error::Persistence(format!("duplicate note id {}", note.id)));
        }
        self.active.insert(0, note.clone());
        Ok(note.clone())
    }

    pub fn replace(&mut self, note: &Note) -> Result<()> {
        let slot = self
            .active
            .iter_mut()
            .find(|existing| existing.id == note.id)
            .ok_or_else(|| Error::NotFound(note.id.clone()))?;
        *slot = note.clone();
        Ok(())
    }

    pub fn trash(&mut self, id: &NoteId, deleted_at: DateTime<Utc>) -> Result<()> {
        let mut note = Self::take(&mut self.active, id)?;
        note.deleted_at = Some(deleted_at);
        self.trash.insert(0, note);
        Ok(())
    }

    pub fn restore(&mut self, id: &NoteId) -> Result<()> {
        let mut note = Self::take(&mut self.trash, id)?;
        note.deleted_at = None;
        self.active.insert(0, note);
        Ok(())
    }

    pub fn purge(&mut self, id: &NoteId) -> Result<()> {
        Self::take(&mut self.trash, id).map(|_| ())
    }

    pub fn purge_expired(&mut self, cutoff: DateTime<Utc>) -> Vec<NoteId> {
        let mut purged = Vec::new();
        self.trash.retain(|note| match note.deleted_at {
            Some(deleted_at) if deleted_at < cutoff => {
                purged.push(note.id.clone());
                false
            }
            _ => true,
        });
        purged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NoteDraft;
    use chrono::Duration;

    fn note(id: &str) -> Note {
        Note::from_draft(NoteId::from(id), NoteDraft::new(id, ""), Utc::now())
    }

    #[test]
    fn insert_rejects_ids_already_in_trash() {
        let mut collections = Collections::default();
        collections.insert(&note("a")).unwrap();
        collections.trash(&NoteId::from("a"), Utc::now()).unwrap();

        let error = collections.insert(&note("a")).unwrap_err();
        assert!(matches!(error, Error::Persistence(_)));
    }

    #[test]
    fn trash_and_restore_move_between_partitions() {
        let mut collections = Collections::default();
        collections.insert(&note("a")).unwrap();
        collections.insert(&note("b")).unwrap();

        collections.trash(&NoteId::from("a"), Utc::now()).unwrap();
        assert_eq!(collections.active.len(), 1);
        assert!(collections.trash[0].deleted_at.is_some());

        collections.restore(&NoteId::from("a")).unwrap();
        assert_eq!(collections.active[0].id, NoteId::from("a"));
        assert!(collections.active[0].deleted_at.is_none());
        assert!(collections.trash.is_empty());
    }

    #[test]
    fn purge_expired_keeps_recent_deletions() {
        let mut collections = Collections::default();
        collections.insert(&note("old")).unwrap();
        collections.insert(&note("new")).unwrap();
        let now = Utc::now();
        collections
            .trash(&NoteId::from("old"), now - Duration::days(8))
            .unwrap();
        collections
            .trash(&NoteId::from("new"), now - Duration::days(3))
            .unwrap();

        let purged = collections.purge_expired(now - Duration::days(7));
        assert_eq!(purged, vec![NoteId::from("old")]);
        assert_eq!(collections.trash.len(), 1);
    }
}
