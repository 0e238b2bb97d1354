use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};

use shoutbox_core::{AccountService, MessageStore};
use shoutbox_types::api::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::middleware::bearer_token;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub accounts: AccountService,
    pub store: MessageStore,
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Argon2 verification is CPU-heavy; run it off the async runtime
    let (identity, token) = tokio::task::spawn_blocking(move || {
        let identity = state.accounts.authenticate(&req.username, &req.password)?;
        let token = state.accounts.login(identity.clone())?;
        Ok::<_, shoutbox_core::Error>((identity, token))
    })
    .await
    .map_err(ApiError::join)??;

    Ok(Json(LoginResponse {
        user_id: identity.user_id,
        username: identity.username,
        token: token.to_string(),
    }))
}

/// Clears whatever session the request presents. Succeeds with 204 even
/// for anonymous or already-expired callers.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = bearer_token(&headers) {
        state.accounts.logout(token)?;
    }
    Ok(StatusCode::NO_CONTENT)
}
