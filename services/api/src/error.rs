//! services/api/src/error.rs
//!
//! Defines the primary error type for the entire API service and how it is
//! rendered as an HTTP response.

use crate::config::ConfigError;
use alumni_map_core::ports::PortError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

/// The primary error type for the `api` service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Represents an error from the underlying database library.
    #[error("Database Error: {0}")]
    Database(#[from] sqlx::Error),

    /// Represents a standard Input/Output error (e.g., binding to a network socket).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A required field was missing or malformed. The message is shown to the caller.
    #[error("{0}")]
    Validation(String),

    /// A uniqueness constraint was violated. The message is shown to the caller.
    #[error("{0}")]
    Conflict(String),

    /// A catch-all for any other unexpected errors. The message is shown to the
    /// caller, so it must not carry backend detail.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Logs the port error and turns it into a caller-facing error.
    ///
    /// Conflicts surface as `conflict_message`; everything else becomes a 500
    /// carrying `failure_message`.
    pub fn from_port(err: PortError, conflict_message: &str, failure_message: &str) -> Self {
        match err {
            PortError::Conflict(detail) => {
                tracing::info!(%detail, "Uniqueness conflict");
                ApiError::Conflict(conflict_message.to_string())
            }
            other => {
                error!("{}: {:?}", failure_message, other);
                ApiError::Internal(failure_message.to_string())
            }
        }
    }

    /// Logs the port error and returns the generic read failure.
    pub fn server_error(err: PortError) -> Self {
        error!("Query failed: {:?}", err);
        ApiError::Internal("Server error".to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            ApiError::Validation(message)
            | ApiError::Conflict(message)
            | ApiError::Internal(message) => message.clone(),
            _ => "Server error".to_string(),
        }
    }
}

// Malformed bodies and query strings are caller mistakes, reported like any other 400.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

/// The JSON body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }
        (
            status,
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}
