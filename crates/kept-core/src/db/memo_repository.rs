//! Server-side memo repository implementation
//!
//! Backs the notes API: rows carry integer ids and soft-delete flags, and
//! trashed rows are purged by age.

use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::{Error, Result};
use crate::models::{Note, NoteDraft, NoteId};

const MEMO_COLUMNS: &str =
    "id, title, content, color, is_pinned, is_archived, deleted_at, created_at, updated_at";

/// Trait for memo storage operations
#[allow(async_fn_in_trait)]
pub trait MemoRepository {
    /// Active memos, newest first
    async fn list_active(&self) -> Result<Vec<Note>>;

    /// Insert a memo stamped `created_at` and return it with its assigned id
    async fn create(&self, draft: &NoteDraft, created_at: DateTime<Utc>) -> Result<Note>;

    /// Overwrite the editable fields of an active memo. `updated_at` never
    /// lands before the memo's creation time.
    async fn replace(
        &self,
        id: &NoteId,
        fields: &NoteDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Note>;

    /// Move an active memo to the trash
    async fn soft_delete(&self, id: &NoteId) -> Result<()>;

    /// Move a trashed memo back to the active set
    async fn restore(&self, id: &NoteId) -> Result<()>;

    /// Trashed memos, most recently deleted first
    async fn list_trash(&self) -> Result<Vec<Note>>;

    /// Permanently delete one trashed memo
    async fn purge(&self, id: &NoteId) -> Result<()>;

    /// Permanently delete every trashed memo deleted before `cutoff`
    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<NoteId>>;
}

/// libSQL implementation of `MemoRepository`
pub struct LibSqlMemoRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlMemoRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    async fn query_notes(&self, sql: &str) -> Result<Vec<Note>> {
        let mut rows = self.conn.query(sql, ()).await?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next().await? {
            notes.push(Self::parse_note(&row)?);
        }
        Ok(notes)
    }

    async fn get_any(&self, id: i64) -> Result<Option<Note>> {
        let sql = format!("SELECT {MEMO_COLUMNS} FROM memos WHERE id = ?");
        let mut rows = self.conn.query(&sql, [id]).await?;
        match rows.next().await? {
            Some(row) => Ok(Some(Self::parse_note(&row)?)),
            None => Ok(None),
        }
    }

    /// Parse a memo from a database row
    fn parse_note(row: &libsql::Row) -> Result<Note> {
        let id: i64 = row.get(0)?;
        let color: String = row.get(3)?;
        let deleted_at: Option<i64> = row.get(6)?;

        Ok(Note {
            id: NoteId::from(id),
            title: row.get(1)?,
            content: row.get(2)?,
            color: color.parse().unwrap_or_default(),
            is_pinned: row.get::<i32>(4)? != 0,
            is_archived: row.get::<i32>(5)? != 0,
            deleted_at: deleted_at.map(from_millis).transpose()?,
            created_at: from_millis(row.get(7)?)?,
            updated_at: from_millis(row.get(8)?)?,
        })
    }
}

/// Row ids are integers; anything else cannot exist in this table.
fn row_id(id: &NoteId) -> Result<i64> {
    id.as_str()
        .parse()
        .map_err(|_| Error::NotFound(id.clone()))
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| Error::Persistence(format!("timestamp out of range: {ms}")))
}

impl MemoRepository for LibSqlMemoRepository<'_> {
    async fn list_active(&self) -> Result<Vec<Note>> {
        self.query_notes(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos
             WHERE is_deleted = 0
             ORDER BY created_at DESC, id DESC"
        ))
        .await
    }

    async fn create(&self, draft: &NoteDraft, created_at: DateTime<Utc>) -> Result<Note> {
        let now = created_at.timestamp_millis();

        self.conn
            .execute(
                "INSERT INTO memos (title, content, color, is_pinned, is_archived, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
                params![
                    draft.title.as_str(),
                    draft.content.as_str(),
                    draft.color.as_str(),
                    i32::from(draft.is_pinned),
                    i32::from(draft.is_archived),
                    now,
                    now
                ],
            )
            .await?;

        let id = self.conn.last_insert_rowid();
        self.get_any(id)
            .await?
            .ok_or_else(|| Error::NotFound(NoteId::from(id)))
    }

    async fn replace(
        &self,
        id: &NoteId,
        fields: &NoteDraft,
        updated_at: DateTime<Utc>,
    ) -> Result<Note> {
        let row = row_id(id)?;
        let now = updated_at.timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE memos
                 SET title = ?, content = ?, color = ?, is_pinned = ?, is_archived = ?,
                     updated_at = MAX(?, created_at)
                 WHERE id = ? AND is_deleted = 0",
                params![
                    fields.title.as_str(),
                    fields.content.as_str(),
                    fields.color.as_str(),
                    i32::from(fields.is_pinned),
                    i32::from(fields.is_archived),
                    now,
                    row
                ],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.clone()));
        }

        self.get_any(row)
            .await?
            .ok_or_else(|| Error::NotFound(id.clone()))
    }

    async fn soft_delete(&self, id: &NoteId) -> Result<()> {
        let row = row_id(id)?;
        let now = Utc::now().timestamp_millis();

        let rows = self
            .conn
            .execute(
                "UPDATE memos SET is_deleted = 1, deleted_at = ? WHERE id = ? AND is_deleted = 0",
                params![now, row],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn restore(&self, id: &NoteId) -> Result<()> {
        let row = row_id(id)?;

        let rows = self
            .conn
            .execute(
                "UPDATE memos SET is_deleted = 0, deleted_at = NULL WHERE id = ? AND is_deleted = 1",
                [row],
            )
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn list_trash(&self) -> Result<Vec<Note>> {
        self.query_notes(&format!(
            "SELECT {MEMO_COLUMNS} FROM memos
             WHERE is_deleted = 1
             ORDER BY deleted_at DESC, id DESC"
        ))
        .await
    }

    async fn purge(&self, id: &NoteId) -> Result<()> {
        let row = row_id(id)?;

        let rows = self
            .conn
            .execute("DELETE FROM memos WHERE id = ? AND is_deleted = 1", [row])
            .await?;

        if rows == 0 {
            return Err(Error::NotFound(id.clone()));
        }
        Ok(())
    }

    async fn purge_expired(&self, cutoff: DateTime<Utc>) -> Result<Vec<NoteId>> {
        let cutoff_ms = cutoff.timestamp_millis();

        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        let purged = async {
            let mut rows = self
                .conn
                .query(
                    "SELECT id FROM memos WHERE is_deleted = 1 AND deleted_at < ?",
                    [cutoff_ms],
                )
                .await?;
            let mut ids = Vec::new();
            while let Some(row) = rows.next().await? {
                ids.push(NoteId::from(row.get::<i64>(0)?));
            }

            self.conn
                .execute(
                    "DELETE FROM memos WHERE is_deleted = 1 AND deleted_at < ?",
                    [cutoff_ms],
                )
                .await?;
            Ok::<_, Error>(ids)
        }
        .await;

        match purged {
            Ok(ids) => {
                if let Err(e) = self.conn.execute("COMMIT", ()).await {
                    self.conn.execute("ROLLBACK", ()).await.ok();
                    return Err(e.into());
                }
                Ok(ids)
            }
            Err(e) => {
                self.conn.execute("ROLLBACK", ()).await.ok();
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::NoteColor;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn backdate_deletion(db: &Database, id: &NoteId, days: i64) {
        let deleted_at = (Utc::now() - chrono::Duration::days(days)).timestamp_millis();
        db.connection()
            .execute(
                "UPDATE memos SET deleted_at = ? WHERE id = ?",
                params![deleted_at, row_id(id).unwrap()],
            )
            .await
            .unwrap();
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_create_assigns_numeric_id() {
        let db = setup().await;
        let repo = LibSqlMemoRepository::new(db.connection());

        let draft = NoteDraft::new("Groceries", "Milk").with_color(NoteColor::Green);
        let note = repo.create(&draft, Utc::now()).await.unwrap();

        assert!(note.id.as_str().parse::<i64>().is_ok());
        assert_eq!(note.color, NoteColor::Green);
        assert_eq!(repo.list_active().await.unwrap(), vec![note]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_caller_timestamps_are_stored() {
        let db = setup().await;
        let repo = LibSqlMemoRepository::new(db.connection());
        let created_at = DateTime::from_timestamp_millis(1_709_294_400_123).unwrap();

        let note = repo
            .create(&NoteDraft::new("t", ""), created_at)
            .await
            .unwrap();
        assert_eq!(note.created_at, created_at);
        assert_eq!(note.updated_at, created_at);

        let edited_at = created_at + chrono::Duration::minutes(5);
        let edited = repo
            .replace(&note.id, &NoteDraft::new("t2", ""), edited_at)
            .await
            .unwrap();
        assert_eq!(edited.updated_at, edited_at);
        assert_eq!(edited.created_at, created_at);

        // A clock behind the creation time is clamped
        let clamped = repo
            .replace(&note.id, &NoteDraft::new("t3", ""), created_at - chrono::Duration::hours(1))
            .await
            .unwrap();
        assert_eq!(clamped.updated_at, created_at);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_replace_missing_is_not_found() {
        let db = setup().await;
        let repo = LibSqlMemoRepository::new(db.connection());

        let error = repo
            .replace(&NoteId::from(99), &NoteDraft::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(error.is_not_found());

        let error = repo
            .replace(&NoteId::from("not-a-number"), &NoteDraft::default(), Utc::now())
            .await
            .unwrap_err();
        assert!(error.is_not_found());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_trash_lifecycle() {
        let db = setup().await;
        let repo = LibSqlMemoRepository::new(db.connection());

        let note = repo.create(&NoteDraft::new("a", "b"), Utc::now()).await.unwrap();
        repo.soft_delete(&note.id).await.unwrap();

        assert!(repo.list_active().await.unwrap().is_empty());
        let trash = repo.list_trash().await.unwrap();
        assert_eq!(trash.len(), 1);
        assert!(trash[0].deleted_at.is_some());

        // Deleting twice is an error, not a silent no-op
        assert!(repo.soft_delete(&note.id).await.unwrap_err().is_not_found());

        repo.restore(&note.id).await.unwrap();
        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].deleted_at, None);
        assert!(repo.restore(&note.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_purge_expired_respects_cutoff() {
        let db = setup().await;
        let repo = LibSqlMemoRepository::new(db.connection());

        let old = repo.create(&NoteDraft::new("old", ""), Utc::now()).await.unwrap();
        let recent = repo.create(&NoteDraft::new("recent", ""), Utc::now()).await.unwrap();
        repo.soft_delete(&old.id).await.unwrap();
        repo.soft_delete(&recent.id).await.unwrap();
        backdate_deletion(&db, &old.id, 10).await;
        backdate_deletion(&db, &recent.id, 3).await;

        let purged = repo
            .purge_expired(Utc::now() - chrono::Duration::days(7))
            .await
            .unwrap();

        assert_eq!(purged, vec![old.id]);
        let trash = repo.list_trash().await.unwrap();
        assert_eq!(trash.len(), 1);
        assert_eq!(trash[0].id, recent.id);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_purge_only_touches_trash() {
        let db = setup().await;
        let repo = LibSqlMemoRepository::new(db.connection());

        let note = repo.create(&NoteDraft::new("keep", ""), Utc::now()).await.unwrap();
        assert!(repo.purge(&note.id).await.unwrap_err().is_not_found());

        repo.soft_delete(&note.id).await.unwrap();
        repo.purge(&note.id).await.unwrap();
        assert!(repo.list_trash().await.unwrap().is_empty());
    }
}
