use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use shoutbox_core::Caller;
use shoutbox_types::api::{EditMessageRequest, PostMessageRequest};
use shoutbox_types::input::{MessageEdit, NewMessage};

use crate::auth::AppState;
use crate::error::ApiError;

/// The public board. Rendering it counts as a view of every message, so
/// this GET writes; the store keeps the counter bump atomic with the
/// read. Open to anonymous callers.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    // Run blocking DB work off the async runtime
    let board = tokio::task::spawn_blocking(move || state.store.list_for_display())
        .await
        .map_err(ApiError::join)??;

    Ok(Json(board))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<PostMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = tokio::task::spawn_blocking(move || {
        state.store.create(&caller, NewMessage { text: req.text })
    })
    .await
    .map_err(ApiError::join)??;

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(caller): Extension<Caller>,
    Json(req): Json<EditMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message = tokio::task::spawn_blocking(move || {
        state.store.edit(&caller, MessageEdit { id, text: req.text })
    })
    .await
    .map_err(ApiError::join)??;

    Ok(Json(message))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    tokio::task::spawn_blocking(move || state.store.delete(&caller, id))
        .await
        .map_err(ApiError::join)??;

    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own messages, for the edit/delete pickers. Read-only —
/// view counters only move on the public listing.
pub async fn list_owned(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<impl IntoResponse, ApiError> {
    let mine = tokio::task::spawn_blocking(move || state.store.list_owned(&caller))
        .await
        .map_err(ApiError::join)??;

    Ok(Json(mine))
}
