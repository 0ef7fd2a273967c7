//! Error handling
//!
//! Every failure a handler can hit maps onto one of three outcomes: bad
//! input (400), unknown uuid (404) or a storage failure (500). Storage
//! details are logged by the service and never reach the response body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

pub const INVALID_DATA_MESSAGE: &str = "Données utilisateur invalides";
pub const NOT_FOUND_MESSAGE: &str = "Utilisateur non trouvé";
pub const INTERNAL_ERROR_MESSAGE: &str = "Erreur interne du serveur";

/// Failure reported by a persistence gateway
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// The backing store cannot be reached
    #[error("database unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate primary key: {0}")]
    DuplicateKey(String),
}

/// Outcome of a failed user operation
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Input rejected by validation. Which field failed is not reported.
    #[error("invalid user data")]
    Validation,

    /// No row carries the requested uuid
    #[error("user not found")]
    NotFound { endpoint: Option<String> },

    #[error(transparent)]
    Persistence(#[from] DbError),
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub error: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match self {
            AppError::Validation => ErrorResponse {
                endpoint: None,
                error: INVALID_DATA_MESSAGE.to_string(),
            },
            AppError::NotFound { endpoint } => ErrorResponse {
                endpoint,
                error: NOT_FOUND_MESSAGE.to_string(),
            },
            AppError::Persistence(_) => ErrorResponse {
                endpoint: None,
                error: INTERNAL_ERROR_MESSAGE.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
