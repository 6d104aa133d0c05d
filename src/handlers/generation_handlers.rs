use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, instrument};

use crate::dto::{CreateGenerationDto, CreateGenerationResponseDto};
use crate::errors::ApiError;
use crate::models::Generation;
use crate::repo;
use crate::{AppState, DEFAULT_USER_ID};

/// Minimum length of the source text, in characters
const MIN_TEXT_LENGTH: usize = 1000;

/// Maximum length of the source text, in characters
const MAX_TEXT_LENGTH: usize = 10000;

/// Maximum number of flashcards per generation
const MAX_CARDS: i32 = 50;

/// Handler for creating a new generation
///
/// This function handles POST requests to `/generations`. It validates the
/// input bounds, then runs the full generation pipeline: generation row,
/// LLM call, flashcard rows, terminal status.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `payload` - The request payload containing the source text and options
///
/// ### Returns
///
/// `201 Created` with the generation id and the generated flashcards
#[instrument(skip(state, payload), fields(text_length = payload.text.chars().count(), max_cards = %payload.options.max_cards))]
pub async fn create_generation_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<CreateGenerationDto>,
) -> Result<(StatusCode, Json<CreateGenerationResponseDto>), ApiError> {
    info!("Creating new generation");

    let text_length = payload.text.chars().count();
    if text_length < MIN_TEXT_LENGTH {
        return Err(ApiError::Validation(format!(
            "Text must be at least {} characters long",
            MIN_TEXT_LENGTH
        )));
    }
    if text_length > MAX_TEXT_LENGTH {
        return Err(ApiError::Validation(format!(
            "Text cannot exceed {} characters",
            MAX_TEXT_LENGTH
        )));
    }
    if payload.options.max_cards < 1 {
        return Err(ApiError::Validation(
            "Must generate at least 1 card".to_string(),
        ));
    }
    if payload.options.max_cards > MAX_CARDS {
        return Err(ApiError::Validation(format!(
            "Cannot generate more than {} cards at once",
            MAX_CARDS
        )));
    }

    let response = state
        .generations
        .create_generation(DEFAULT_USER_ID, &payload.text, payload.options.max_cards)
        .await?;

    info!(
        "Successfully created generation {} with {} flashcards",
        response.generation_id,
        response.flashcards.len()
    );

    Ok((StatusCode::CREATED, Json(response)))
}

/// Handler for retrieving a specific generation
///
/// This function handles GET requests to `/generations/{id}`. The returned
/// log payload carries the lifecycle status; failed generations can be
/// explained by joining against their error-log rows.
///
/// ### Returns
///
/// The requested generation as JSON, or null if not found
#[instrument(skip(state), fields(generation_id = %id))]
pub async fn get_generation_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract the generation ID from the URL path
    Path(id): Path<String>,
) -> Result<Json<Option<Generation>>, ApiError> {
    debug!("Getting generation");

    let generation = repo::get_generation(&state.pool, &id).map_err(ApiError::Database)?;
    let generation = generation.filter(|g| g.get_user_id() == DEFAULT_USER_ID);

    Ok(Json(generation))
}
