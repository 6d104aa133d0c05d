use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json
};
use thiserror::Error;
use tracing::error;

use crate::services::GenerationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
    #[error("Flashcard not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Database(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Flashcard not found".to_string()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Generation(err) => {
                // The pipeline already logged an error-log row; the caller only
                // gets a generic message.
                error!("Generation request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to process generation request".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
