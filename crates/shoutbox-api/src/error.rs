use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use shoutbox_core::Error;

/// Newtype over the core error so handlers can use `?`. Each kind maps to
/// one status; storage details are logged, never sent to the client.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    /// A panicked or cancelled blocking task surfaces as a storage-level
    /// failure of the triggering request.
    pub(crate) fn join(e: tokio::task::JoinError) -> Self {
        error!("spawn_blocking join error: {}", e);
        ApiError(Error::Storage(anyhow::anyhow!("worker task failed: {}", e)))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Unauthenticated | Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::UsernameTaken => StatusCode::CONFLICT,
            Error::InvalidText { .. } => StatusCode::BAD_REQUEST,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = match &self.0 {
            Error::Storage(e) => {
                error!("storage failure: {:#}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: Error) -> StatusCode {
        ApiError(e).into_response().status()
    }

    #[test]
    fn each_error_kind_has_its_status() {
        assert_eq!(status_of(Error::Unauthenticated), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(Error::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(Error::UsernameTaken), StatusCode::CONFLICT);
        assert_eq!(
            status_of(Error::InvalidText { len: 0 }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(Error::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(Error::Storage(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
