use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use shoutbox_core::SessionToken;

use crate::auth::AppState;
use crate::error::ApiError;

/// Pull the session token out of the Authorization header. Anything that
/// is not `Bearer <uuid>` reads as "no session bound".
pub fn bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .and_then(|v| v.parse::<Uuid>().ok())
}

/// Resolve the request's session into a `Caller` extension. Anonymous
/// requests pass through — operations that need an identity reject them
/// in the store, which is where the ownership rules live anyway.
pub async fn identify(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let caller = state.accounts.current_identity(bearer_token(req.headers()))?;

    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}
