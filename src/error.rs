// HTTP API Error Types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::database::DatabaseError;

/// Which write failed; selects the wording of the error text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    Create,
    Update,
    Delete,
}

impl WriteAction {
    fn failure_prefix(self) -> &'static str {
        match self {
            WriteAction::Create => "Erreur lors de l'ajout du message: ",
            WriteAction::Update => "Erreur lors de la mise à jour du message : ",
            WriteAction::Delete => "Erreur lors de la suppression du message : ",
        }
    }
}

/// HTTP API error rendered as a plain-text body
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 404 Not Found
    #[error("Not Found")]
    NotFound,

    // 500, or 200 in legacy mode
    #[error("{}{message}", .action.failure_prefix())]
    Persistence {
        action: WriteAction,
        message: String,
        legacy_status: bool,
    },

    // 500 Internal Server Error
    #[error("{0}")]
    InternalServerError(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    /// Map a failed write. A missing row stays a 404, anything else is a
    /// persistence failure carrying the storage error text.
    pub fn from_write(action: WriteAction, err: DatabaseError, legacy_status: bool) -> Self {
        match err {
            DatabaseError::NotFound(_) => ApiError::NotFound,
            other => {
                tracing::error!("Failed to {:?} message: {}", action, other);
                ApiError::Persistence {
                    action,
                    message: other.to_string(),
                    legacy_status,
                }
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Persistence { legacy_status: true, .. } => StatusCode::OK,
            ApiError::Persistence { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(_) => ApiError::NotFound,
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error(other.to_string())
            }
        }
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}
