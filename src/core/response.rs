//! Response bodies that are not a user record

use serde::{Deserialize, Serialize};

pub const USER_DELETED_MESSAGE: &str = "Utilisateur supprimé";

/// `{ "message": ... }`
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
}

impl HealthResponse {
    pub fn up() -> Self {
        Self {
            status: "OK".to_string(),
            database: "connected".to_string(),
        }
    }

    pub fn down() -> Self {
        Self {
            status: "ERROR".to_string(),
            database: "disconnected".to_string(),
        }
    }
}
