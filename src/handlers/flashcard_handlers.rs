use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::{debug, info, instrument};

use crate::dto::{FlashcardPageDto, FlashcardQueryDto, PaginationDto, UpdateFlashcardDto};
use crate::errors::ApiError;
use crate::models::{Flashcard, FlashcardSource, FlashcardStatus};
use crate::repo;
use crate::{AppState, DEFAULT_USER_ID};

/// Maximum page size for flashcard listings
const MAX_LIMIT: i64 = 100;

/// Maximum length of a flashcard front, in characters
const MAX_FRONT_LENGTH: usize = 200;

/// Maximum length of a flashcard back, in characters
const MAX_BACK_LENGTH: usize = 500;

fn validate_query(query: &FlashcardQueryDto) -> Result<(), ApiError> {
    if query.limit < 1 || query.limit > MAX_LIMIT {
        return Err(ApiError::Validation(format!(
            "limit must be between 1 and {}",
            MAX_LIMIT
        )));
    }
    if query.offset < 0 {
        return Err(ApiError::Validation("offset must not be negative".to_string()));
    }
    if let Some(status) = &query.status {
        // Listing filters only distinguish reviewed cards
        if status != "accepted" && status != "rejected" {
            return Err(ApiError::Validation(
                "status must be one of: accepted, rejected".to_string(),
            ));
        }
    }
    if let Some(source) = &query.source {
        if FlashcardSource::parse(source).is_none() {
            return Err(ApiError::Validation(
                "source must be one of: ai-full, ai-edited, manual".to_string(),
            ));
        }
    }
    if query.sort != "created_at" && query.sort != "updated_at" {
        return Err(ApiError::Validation(
            "sort must be one of: created_at, updated_at".to_string(),
        ));
    }
    if query.order != "asc" && query.order != "desc" {
        return Err(ApiError::Validation(
            "order must be one of: asc, desc".to_string(),
        ));
    }
    Ok(())
}

/// Handler for listing flashcards with filtering and pagination
///
/// This function handles GET requests to `/flashcards`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `query` - Query parameters for filtering, sorting and pagination
///
/// ### Returns
///
/// A page of flashcards together with pagination metadata as JSON
#[instrument(skip(state, query))]
pub async fn list_flashcards_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract and parse query parameters
    Query(query): Query<FlashcardQueryDto>,
) -> Result<Json<FlashcardPageDto>, ApiError> {
    debug!("Listing flashcards with filters: {:?}", query);

    validate_query(&query)?;

    let (cards, total) =
        repo::list_flashcards(&state.pool, DEFAULT_USER_ID, &query).map_err(ApiError::Database)?;

    info!("Retrieved {} of {} flashcards", cards.len(), total);

    Ok(Json(FlashcardPageDto {
        data: cards,
        pagination: PaginationDto {
            total,
            limit: query.limit,
            offset: query.offset,
        },
    }))
}

/// Handler for updating a flashcard
///
/// This function handles PATCH requests to `/flashcards/{id}`. Fields left
/// out of the payload are preserved.
///
/// ### Returns
///
/// The updated flashcard as JSON, or 404 if no matching flashcard exists
#[instrument(skip(state, payload), fields(flashcard_id = %id))]
pub async fn update_flashcard_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract the flashcard ID from the URL path
    Path(id): Path<String>,
    // Extract and deserialize the JSON request body
    Json(payload): Json<UpdateFlashcardDto>,
) -> Result<Json<Flashcard>, ApiError> {
    debug!("Updating flashcard");

    if let Some(front) = &payload.front {
        if front.chars().count() > MAX_FRONT_LENGTH {
            return Err(ApiError::Validation(format!(
                "front cannot exceed {} characters",
                MAX_FRONT_LENGTH
            )));
        }
    }
    if let Some(back) = &payload.back {
        if back.chars().count() > MAX_BACK_LENGTH {
            return Err(ApiError::Validation(format!(
                "back cannot exceed {} characters",
                MAX_BACK_LENGTH
            )));
        }
    }
    if let Some(status) = &payload.status {
        if FlashcardStatus::parse(status).is_none() {
            return Err(ApiError::Validation(
                "status must be one of: accepted, rejected, pending".to_string(),
            ));
        }
    }

    let updated = repo::update_flashcard(&state.pool, &id, DEFAULT_USER_ID, &payload)
        .map_err(ApiError::Database)?
        .ok_or(ApiError::NotFound)?;

    info!("Updated flashcard {}", id);
    Ok(Json(updated))
}

/// Handler for deleting a flashcard
///
/// This function handles DELETE requests to `/flashcards/{id}`.
///
/// ### Returns
///
/// `204 No Content` on success, or 404 if no matching flashcard exists
#[instrument(skip(state), fields(flashcard_id = %id))]
pub async fn delete_flashcard_handler(
    // Extract the application state
    State(state): State<AppState>,
    // Extract the flashcard ID from the URL path
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!("Deleting flashcard");

    let deleted = repo::delete_flashcard(&state.pool, &id, DEFAULT_USER_ID)
        .map_err(ApiError::Database)?;

    if !deleted {
        return Err(ApiError::NotFound);
    }

    info!("Deleted flashcard {}", id);
    Ok(StatusCode::NO_CONTENT)
}
