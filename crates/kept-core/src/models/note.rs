//! Note model

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::color::{deserialize_lenient, NoteColor};

/// Opaque note identifier.
///
/// Locally created notes get a UUID v7 (time-sortable); notes created through
/// the remote service carry whatever id the server assigned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Generate a fresh unique note ID using UUID v7
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for NoteId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNoteId {
    Text(String),
    Number(i64),
}

// The remote service hands out numeric ids; everything else uses strings.
impl<'de> Deserialize<'de> for NoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawNoteId::deserialize(deserializer)? {
            RawNoteId::Text(text) => Self(text),
            RawNoteId::Number(number) => Self::from(number),
        })
    }
}

/// A note in the system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier, stable across delete and restore
    pub id: NoteId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub color: NoteColor,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
    /// Set while the note sits in the trash
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Build a note from a draft, stamping both timestamps with `now`.
    #[must_use]
    pub fn from_draft(id: NoteId, draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            color: draft.color,
            is_pinned: draft.is_pinned,
            is_archived: draft.is_archived,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the note is soft-deleted
    #[must_use]
    pub const fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Refresh `updated_at`, never letting it fall behind `created_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }

    /// Title when present, otherwise the first content line, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        let source = if self.title.trim().is_empty() {
            self.content.lines().next().unwrap_or("")
        } else {
            self.title.as_str()
        };
        source.trim().chars().take(max_len).collect()
    }

    /// A note with neither title nor content
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.title.trim().is_empty() && self.content.trim().is_empty()
    }
}

/// Fields supplied when creating a note; id and timestamps are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub color: NoteColor,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub is_archived: bool,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn with_color(mut self, color: NoteColor) -> Self {
        self.color = color;
        self
    }

    #[must_use]
    pub const fn pinned(mut self, is_pinned: bool) -> Self {
        self.is_pinned = is_pinned;
        self
    }

    #[must_use]
    pub const fn archived(mut self, is_archived: bool) -> Self {
        self.is_archived = is_archived;
        self
    }
}

impl From<&Note> for NoteDraft {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            content: note.content.clone(),
            color: note.color,
            is_pinned: note.is_pinned,
            is_archived: note.is_archived,
        }
    }
}

/// Partial update merged over an existing note. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub color: Option<NoteColor>,
    pub is_pinned: Option<bool>,
    pub is_archived: Option<bool>,
}

impl NotePatch {
    pub fn text(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn color(color: NoteColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn pinned(is_pinned: bool) -> Self {
        Self {
            is_pinned: Some(is_pinned),
            ..Self::default()
        }
    }

    pub fn archived(is_archived: bool) -> Self {
        Self {
            is_archived: Some(is_archived),
            ..Self::default()
        }
    }

    /// Every editable field of `note`, as saved from a full editor form.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: Some(note.title.clone()),
            content: Some(note.content.clone()),
            color: Some(note.color),
            is_pinned: Some(note.is_pinned),
            is_archived: Some(note.is_archived),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.color.is_none()
            && self.is_pinned.is_none()
            && self.is_archived.is_none()
    }

    /// Merge this patch over `note`. Timestamps are the caller's business.
    pub fn apply(&self, note: &mut Note) {
        if let Some(title) = &self.title {
            note.title.clone_from(title);
        }
        if let Some(content) = &self.content {
            note.content.clone_from(content);
        }
        if let Some(color) = self.color {
            note.color = color;
        }
        if let Some(is_pinned) = self.is_pinned {
            note.is_pinned = is_pinned;
        }
        if let Some(is_archived) = self.is_archived {
            note.is_archived = is_archived;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn sample() -> Note {
        Note::from_draft(
            NoteId::from("n1"),
            NoteDraft::new("Groceries", "Milk, eggs"),
            Utc::now(),
        )
    }

    #[test]
    fn test_note_id_unique() {
        let id1 = NoteId::generate();
        let id2 = NoteId::generate();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_from_draft_sets_equal_timestamps() {
        let note = sample();
        assert_eq!(note.title, "Groceries");
        assert_eq!(note.color, NoteColor::Default);
        assert!(!note.is_deleted());
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_touch_never_precedes_creation() {
        let mut note = sample();
        let created = note.created_at;
        note.touch(created - Duration::hours(1));
        assert_eq!(note.updated_at, created);

        note.touch(created + Duration::seconds(5));
        assert_eq!(note.updated_at, created + Duration::seconds(5));
    }

    #[test]
    fn test_patch_only_touches_given_fields() {
        let mut note = sample();
        NotePatch::color(NoteColor::Blue).apply(&mut note);
        assert_eq!(note.color, NoteColor::Blue);
        assert_eq!(note.title, "Groceries");
        assert!(!note.is_pinned);

        NotePatch::pinned(true).apply(&mut note);
        NotePatch::archived(true).apply(&mut note);
        assert!(note.is_pinned && note.is_archived);
    }

    #[test]
    fn test_remote_record_defaults() {
        let json = r#"{
            "id": 42,
            "title": "From server",
            "content": "body",
            "isPinned": true,
            "isArchived": false,
            "isDeleted": false,
            "deletedAt": null,
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T11:30:00.123456789Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.id, NoteId::from("42"));
        assert_eq!(note.color, NoteColor::Default);
        assert!(note.is_pinned);
        assert!(note.deleted_at.is_none());
        assert!(note.updated_at > note.created_at);
    }

    #[test]
    fn test_unknown_color_falls_back_to_default() {
        let json = r#"{
            "id": "x",
            "color": "chartreuse",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:00:00Z"
        }"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.color, NoteColor::Default);
        assert_eq!(note.title, "");
    }

    #[test]
    fn test_wire_names_are_camel_case() {
        let value = serde_json::to_value(sample()).unwrap();
        assert!(value.get("isPinned").is_some());
        assert!(value.get("createdAt").is_some());
        assert_eq!(value["id"], "n1");
    }

    #[test]
    fn test_title_preview_falls_back_to_content() {
        let mut note = sample();
        assert_eq!(note.title_preview(4), "Groc");
        note.title = String::new();
        note.content = "First line\nSecond".to_string();
        assert_eq!(note.title_preview(50), "First line");
    }
}
