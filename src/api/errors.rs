use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::services::market_data::errors::FetchError;

/// JSON body of every non-2xx API response. `error` is a stable
/// snake_case identifier a front end can match on.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    status: u16,
    error: String,
    message: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, error: &str, message: &str) -> Self {
        ErrorResponse {
            status: status.as_u16(),
            error: error.to_string(),
            message: message.to_string(),
        }
    }

    pub fn unknown_instrument(code: &str) -> Self {
        ErrorResponse::new(
            StatusCode::NOT_FOUND,
            "unknown_instrument",
            &format!("No instrument with code {}", code),
        )
    }
}

impl From<FetchError> for ErrorResponse {
    fn from(err: FetchError) -> Self {
        let (status, error) = match err {
            FetchError::Transport(_) => (StatusCode::BAD_GATEWAY, "transport_error"),
            FetchError::Schema(_) => (StatusCode::BAD_GATEWAY, "schema_error"),
            FetchError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        };
        ErrorResponse::new(status, error, &err.to_string())
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
