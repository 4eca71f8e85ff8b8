use crate::api::ErrorResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{Error, ErrorKind};
use tracing::error;

/// Maps the core's error kinds onto client-visible statuses.
/// Lookup and validation failures are the caller's to fix (400); everything
/// else is a server-side failure (500) whose detail stays in the logs.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    pub fn public_message(&self) -> String {
        match self.0.kind() {
            ErrorKind::Lookup | ErrorKind::Validation => self.0.to_string(),
            ErrorKind::Upstream | ErrorKind::Transport | ErrorKind::Serialization => {
                "ledger request failed".to_string()
            }
            ErrorKind::Cache | ErrorKind::Config => "internal error".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        }
        (status, Json(ErrorResponse::new(self.public_message()))).into_response()
    }
}
