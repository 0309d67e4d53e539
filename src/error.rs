//! Error Taxonomy
//!
//! Every boundary operation maps collaborator failures into exactly one of
//! these kinds; handlers return them straight to axum. No retries anywhere.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::deck::DeckError;
use crate::network::auth::AuthError;
use crate::store::StoreError;

/// Request-handling errors, each mapping to one HTTP status class.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed identifier or request body.
    #[error("{0}")]
    Validation(String),

    /// Missing/malformed claims or a room-claim mismatch.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Room or player absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Store or transport failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(entity) => ApiError::NotFound(entity),
            StoreError::Internal(message) => ApiError::Internal(message),
        }
    }
}

impl From<DeckError> for ApiError {
    fn from(err: DeckError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::Validation("bad id".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Auth(AuthError::RoomMismatch).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::NotFound("room").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_not_found_maps_to_not_found() {
        let err: ApiError = StoreError::NotFound("player").into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }
}
