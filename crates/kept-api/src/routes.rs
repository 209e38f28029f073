use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use kept_core::db::{Database, LibSqlMemoRepository, MemoRepository};
use kept_core::{Note, NoteDraft, NoteId};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;

#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Database>>,
    trash_retention: chrono::Duration,
}

impl AppState {
    pub fn new(db: Database, trash_retention: chrono::Duration) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            trash_retention,
        }
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(list_active))
        .route("/health", get(health))
        .route("/memo", post(create_memo))
        .route("/memo/{id}", delete(delete_memo).put(update_memo))
        .route("/memo/{id}/restore", patch(restore_memo))
        .route("/trash", get(list_trash))
        .route("/trash/permanent", delete(purge_expired))
        .route("/trash/{id}", delete(purge_memo))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_headers(Any)
                .allow_methods(Any),
        )
        .with_state(state)
}

/// Memo ids on the wire are row ids.
fn parse_id(raw: &str) -> Result<(i64, NoteId), AppError> {
    let row = raw
        .trim()
        .parse::<i64>()
        .map_err(|_| AppError::bad_request(format!("invalid memo id '{raw}'")))?;
    Ok((row, NoteId::from(row)))
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    timestamp: i64,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().timestamp(),
    })
}

async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<Note>>, AppError> {
    let db = state.db.lock().await;
    let notes = LibSqlMemoRepository::new(db.connection())
        .list_active()
        .await?;
    Ok(Json(notes))
}

/// Body of `POST /memo` and `PUT /memo/{id}`. Clients may send their own
/// timestamps; the server stamps the current time when they are absent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemoPayload {
    #[serde(flatten)]
    fields: NoteDraft,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreatedResponse {
    id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

async fn create_memo(
    State(state): State<AppState>,
    Json(payload): Json<MemoPayload>,
) -> Result<Json<CreatedResponse>, AppError> {
    let created_at = payload.created_at.unwrap_or_else(Utc::now);
    let db = state.db.lock().await;
    let note = LibSqlMemoRepository::new(db.connection())
        .create(&payload.fields, created_at)
        .await?;
    let id = note
        .id
        .as_str()
        .parse::<i64>()
        .map_err(|_| AppError::internal(format!("memo stored with non-numeric id {}", note.id)))?;

    tracing::info!(memo = id, "Created memo");
    Ok(Json(CreatedResponse {
        id,
        created_at: note.created_at,
        updated_at: note.updated_at,
    }))
}

async fn update_memo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(payload): Json<MemoPayload>,
) -> Result<StatusCode, AppError> {
    let (row, id) = parse_id(&raw_id)?;
    let updated_at = payload.updated_at.unwrap_or_else(Utc::now);
    let db = state.db.lock().await;
    LibSqlMemoRepository::new(db.connection())
        .replace(&id, &payload.fields, updated_at)
        .await?;

    tracing::debug!(memo = row, "Updated memo");
    Ok(StatusCode::OK)
}

async fn delete_memo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let (row, id) = parse_id(&raw_id)?;
    let db = state.db.lock().await;
    LibSqlMemoRepository::new(db.connection())
        .soft_delete(&id)
        .await?;

    tracing::info!(memo = row, "Moved memo to trash");
    Ok(StatusCode::OK)
}

async fn restore_memo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let (row, id) = parse_id(&raw_id)?;
    let db = state.db.lock().await;
    LibSqlMemoRepository::new(db.connection())
        .restore(&id)
        .await?;

    tracing::info!(memo = row, "Restored memo from trash");
    Ok(StatusCode::OK)
}

async fn list_trash(State(state): State<AppState>) -> Result<Json<Vec<Note>>, AppError> {
    let db = state.db.lock().await;
    let notes = LibSqlMemoRepository::new(db.connection())
        .list_trash()
        .await?;
    Ok(Json(notes))
}

async fn purge_memo(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let (row, id) = parse_id(&raw_id)?;
    let db = state.db.lock().await;
    LibSqlMemoRepository::new(db.connection())
        .purge(&id)
        .await?;

    tracing::info!(memo = row, "Permanently deleted memo");
    Ok(StatusCode::OK)
}

async fn purge_expired(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let cutoff = Utc::now() - state.trash_retention;
    let db = state.db.lock().await;
    let purged = LibSqlMemoRepository::new(db.connection())
        .purge_expired(cutoff)
        .await?;

    tracing::info!(
        count = purged.len(),
        cutoff = %cutoff,
        "Purged expired memos from trash"
    );
    Ok(StatusCode::OK)
}
