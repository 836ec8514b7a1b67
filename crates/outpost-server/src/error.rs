//! Error type for the Outpost HTTP API.
//!
//! [`ApiError`] wraps every game failure plus the few that only exist at
//! the HTTP edge (malformed ids and quantities). Its
//! [`IntoResponse`](axum::response::IntoResponse) implementation maps the
//! error kind to a status and renders `{ "error", "code", "status" }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use outpost_core::{ErrorKind, GameError};
use tracing::error;

/// Errors returned by API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// A game operation failed.
    #[error(transparent)]
    Game(#[from] GameError),

    /// A path or query id is not a valid UUID.
    #[error("invalid id: {0}")]
    InvalidId(String),

    /// A quantity is not a positive integer that fits in 32 bits.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// A path value could not be interpreted.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    /// Stable machine-readable error code.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Game(inner) => inner.code(),
            Self::InvalidId(_) => "InvalidId",
            Self::InvalidQuantity(_) => "InvalidQuantity",
            Self::BadRequest(_) => "BadRequest",
        }
    }

    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Game(inner) => match inner.kind() {
                ErrorKind::Validation => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Conflict => StatusCode::CONFLICT,
                ErrorKind::Capacity => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidId(_) | Self::InvalidQuantity(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "request failed");
        }

        let body = serde_json::json!({
            "error": self.to_string(),
            "code": self.code(),
            "status": status.as_u16(),
        });

        (status, axum::Json(body)).into_response()
    }
}
