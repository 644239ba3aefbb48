use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Error taxonomy for the API. Handlers return `Result<_, ApiError>` and the
/// boundary translation to the `{success:false, error}` envelope happens in
/// the `IntoResponse` impl below.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database unavailable: {0}")]
    DatabaseUnavailable(String),

    #[error("operation timed out: {0}")]
    ConnectionTimeout(String),

    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    MalformedInput(String),

    #[error("{context}: {source}")]
    Database {
        context: String,
        #[source]
        source: mongodb::error::Error,
    },
}

impl ApiError {
    pub fn database(context: impl Into<String>, source: mongodb::error::Error) -> Self {
        ApiError::Database {
            context: context.into(),
            source,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::MalformedInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "success": false, "error": self.to_string() }))).into_response()
    }
}
