//! HTTP client for the remote notes service.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Response, StatusCode};
use serde::Deserialize;

use super::NoteBackend;
use crate::error::{Error, Result};
use crate::models::{Note, NoteId};
use crate::util::body_snippet;

/// Longest slice of an error response kept in the error message.
const ERROR_BODY_LIMIT: usize = 200;

/// Reply to `POST /memo`. Servers that only send the id leave the
/// client's timestamps in place.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResponse {
    id: NoteId,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl CreatedResponse {
    fn stored(self, note: &Note) -> Note {
        let mut stored = note.clone();
        stored.id = self.id;
        if let Some(created_at) = self.created_at {
            stored.created_at = created_at;
        }
        if let Some(updated_at) = self.updated_at {
            stored.updated_at = updated_at;
        }
        stored
    }
}

/// Backend that forwards every operation to the notes API.
///
/// Ids are assigned by the server, deletion timestamps are stamped by the
/// server, and the retention cutoff for bulk purges is the server's own.
#[derive(Clone)]
pub struct RemoteBackend {
    base_url: String,
    client: reqwest::Client,
}

impl RemoteBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Map non-success statuses to errors; a 404 on `id` becomes `NotFound`.
    async fn check(response: Response, id: Option<&NoteId>) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
            return Err(Error::NotFound(id.clone()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(Error::Persistence(format!(
            "notes service returned HTTP {}: {}",
            status.as_u16(),
            body_snippet(&body, ERROR_BODY_LIMIT)
        )))
    }

    async fn get_notes(&self, path: &str) -> Result<Vec<Note>> {
        let response = self.client.get(self.url(path)).send().await?;
        let response = Self::check(response, None).await?;
        // An empty list may arrive as `null`
        let notes: Option<Vec<Note>> = response.json().await?;
        Ok(notes.unwrap_or_default())
    }
}

impl NoteBackend for RemoteBackend {
    async fn load_active(&self) -> Result<Vec<Note>> {
        let notes = self.get_notes("/").await?;
        tracing::debug!("Fetched {} notes from {}", notes.len(), self.base_url);
        Ok(notes)
    }

    async fn insert(&self, note: &Note) -> Result<Note> {
        let response = self
            .client
            .post(self.url("/memo"))
            .json(note)
            .send()
            .await?;
        let created: CreatedResponse = Self::check(response, None).await?.json().await?;
        Ok(created.stored(note))
    }

    async fn replace(&self, note: &Note) -> Result<()> {
        let response = self
            .client
            .put(self.url(&format!("/memo/{}", note.id)))
            .json(note)
            .send()
            .await?;
        Self::check(response, Some(&note.id)).await?;
        Ok(())
    }

    async fn trash(&self, id: &NoteId, _deleted_at: DateTime<Utc>) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/memo/{id}")))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn list_trash(&self) -> Result<Vec<Note>> {
        self.get_notes("/trash").await
    }

    async fn restore(&self, id: &NoteId) -> Result<()> {
        let response = self
            .client
            .patch(self.url(&format!("/memo/{id}/restore")))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    async fn purge(&self, id: &NoteId) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/trash/{id}")))
            .send()
            .await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    /// The server applies its own retention window, so `cutoff` is advisory.
    /// The purged ids are recovered by diffing the trash around the call.
    async fn purge_expired(&self, _cutoff: DateTime<Utc>) -> Result<Vec<NoteId>> {
        let before = self.list_trash().await?;

        let response = self
            .client
            .delete(self.url("/trash/permanent"))
            .send()
            .await?;
        Self::check(response, None).await?;

        let remaining: HashSet<NoteId> = self
            .list_trash()
            .await?
            .into_iter()
            .map(|note| note.id)
            .collect();

        Ok(before
            .into_iter()
            .map(|note| note.id)
            .filter(|id| !remaining.contains(id))
            .collect())
    }
}
