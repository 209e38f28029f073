//! Key-value repository implementation

use crate::error::Result;
use libsql::{params, Connection};

/// Trait for whole-value storage under fixed keys (async)
#[allow(async_fn_in_trait)]
pub trait KeyValueRepository {
    /// Read the value stored under `key`, if any
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Overwrite several keys atomically: either all writes land or none do
    async fn put_many(&self, entries: &[(&str, &str)]) -> Result<()>;
}

/// libSQL implementation of `KeyValueRepository`
pub struct LibSqlKeyValueRepository<'a> {
    conn: &'a Connection,
}

impl<'a> LibSqlKeyValueRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    async fn write(&self, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp_millis();
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)",
                params![key, value, now],
            )
            .await?;
        Ok(())
    }
}

impl KeyValueRepository for LibSqlKeyValueRepository<'_> {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut rows = self
            .conn
            .query("SELECT value FROM kv_store WHERE key = ?", [key])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row.get::<String>(0)?))
        } else {
            Ok(None)
        }
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        self.write(key, value).await
    }

    async fn put_many(&self, entries: &[(&str, &str)]) -> Result<()> {
        self.conn.execute("BEGIN TRANSACTION", ()).await?;

        for (key, value) in entries {
            if let Err(e) = self.write(key, value).await {
                self.conn.execute("ROLLBACK", ()).await.ok();
                return Err(e);
            }
        }

        if let Err(e) = self.conn.execute("COMMIT", ()).await {
            self.conn.execute("ROLLBACK", ()).await.ok();
            return Err(e.into());
        }

        Ok(())
    }
}
