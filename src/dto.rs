use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Flashcard, FlashcardSource, FlashcardStatus};

/// Data transfer object for creating a new generation
///
/// This struct is used to deserialize JSON requests for generating flashcards.
#[derive(Deserialize, Debug)]
pub struct CreateGenerationDto {
    /// The source text to generate flashcards from
    pub text: String,

    /// Generation options
    pub options: GenerationOptionsDto,
}

/// Options controlling a generation request
#[derive(Deserialize, Debug)]
pub struct GenerationOptionsDto {
    /// How many flashcards to generate (1-50)
    pub max_cards: i32,
}

/// A flashcard produced by the generation adapter but not yet persisted
///
/// Carries the id, timestamps and provenance the adapter assigned; the
/// orchestrator copies these verbatim into the persisted row.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GeneratedFlashcardDto {
    /// Generated identifier (UUID v4 as string)
    pub id: String,

    /// The front side: the question or concept, trimmed
    pub front: String,

    /// The back side: the answer or explanation, trimmed
    pub back: String,

    /// Always `pending` at creation
    pub status: FlashcardStatus,

    /// Always `ai-full` for generated cards
    pub source: FlashcardSource,

    /// Shared creation timestamp, identical across one generated batch
    pub created_at: DateTime<Utc>,

    /// Shared update timestamp, identical across one generated batch
    pub updated_at: DateTime<Utc>,
}

impl GeneratedFlashcardDto {
    /// Converts this generated value into a persistable flashcard row
    ///
    /// ### Arguments
    ///
    /// * `user_id` - The ID of the owning user
    /// * `generation_id` - The ID of the parent generation
    pub fn to_flashcard(&self, user_id: &str, generation_id: &str) -> Flashcard {
        Flashcard::new_with_fields(
            self.id.clone(),
            user_id.to_string(),
            Some(generation_id.to_string()),
            self.front.clone(),
            self.back.clone(),
            self.status,
            self.source,
            self.created_at,
            self.updated_at,
        )
    }
}

/// Response body for a successful generation
#[derive(Serialize, Deserialize, Debug)]
pub struct CreateGenerationResponseDto {
    /// The ID of the generation row that was created
    pub generation_id: String,

    /// The generated flashcards, already persisted
    pub flashcards: Vec<GeneratedFlashcardDto>,
}

/// Data transfer object for listing flashcards with filters and pagination
///
/// This struct is used to deserialize query parameters on GET /flashcards.
#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct FlashcardQueryDto {
    /// Maximum number of flashcards to return (1-100)
    pub limit: i64,

    /// Number of flashcards to skip
    pub offset: i64,

    /// Filter by review status ("accepted" or "rejected")
    pub status: Option<String>,

    /// Filter by source ("ai-full", "ai-edited" or "manual")
    pub source: Option<String>,

    /// Column to sort by ("created_at" or "updated_at")
    pub sort: String,

    /// Sort direction ("asc" or "desc")
    pub order: String,
}

impl Default for FlashcardQueryDto {
    fn default() -> Self {
        Self {
            limit: 20,
            offset: 0,
            status: None,
            source: None,
            sort: "created_at".to_string(),
            order: "desc".to_string(),
        }
    }
}

/// Pagination metadata returned alongside a flashcard listing
#[derive(Serialize, Deserialize, Debug)]
pub struct PaginationDto {
    /// Total number of flashcards matching the filters
    pub total: i64,

    /// The limit that was applied
    pub limit: i64,

    /// The offset that was applied
    pub offset: i64,
}

/// Response body for GET /flashcards
#[derive(Serialize, Deserialize, Debug)]
pub struct FlashcardPageDto {
    /// The page of flashcards
    pub data: Vec<Flashcard>,

    /// Pagination metadata
    pub pagination: PaginationDto,
}

/// Data transfer object for updating a flashcard
///
/// All fields are optional; omitted fields are left unchanged.
#[derive(Deserialize, Serialize, Debug, Default)]
pub struct UpdateFlashcardDto {
    /// New front side text (max 200 characters)
    pub front: Option<String>,

    /// New back side text (max 500 characters)
    pub back: Option<String>,

    /// New review status ("accepted", "rejected" or "pending")
    pub status: Option<String>,
}
