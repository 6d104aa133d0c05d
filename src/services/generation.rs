use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::db::DbPool;
use crate::dto::CreateGenerationResponseDto;
use crate::models::{Flashcard, Generation, GenerationErrorCode, GenerationStatus};
use crate::repo;
use crate::services::flashcard_generator::FlashcardGenerator;
use crate::services::openrouter::OpenRouterError;

/// Errors produced by the generation orchestrator
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The initial generation-row insert failed
    #[error("Failed to create generation record: {0}")]
    RecordInsert(#[source] anyhow::Error),

    /// The AI generation step failed (chat call or response validation)
    #[error(transparent)]
    Generator(#[from] OpenRouterError),

    /// Inserting the generated flashcard rows failed
    #[error("Failed to create flashcard records")]
    FlashcardsInsert,

    /// A database operation outside the logged pipeline stages failed
    #[error("Database error: {0}")]
    Database(#[source] anyhow::Error),
}

/// Coordinates persistence around the flashcard generation adapter
///
/// Owns the generation lifecycle: it creates the generation row, delegates to
/// the adapter, persists the resulting flashcards, and records an error-log
/// row for whichever stage fails. Errors are always logged and then
/// re-raised, never swallowed.
pub struct GenerationService {
    pool: Arc<DbPool>,
    generator: Arc<FlashcardGenerator>,
}

impl GenerationService {
    /// Creates a new orchestrator over the given pool and generator
    pub fn new(pool: Arc<DbPool>, generator: Arc<FlashcardGenerator>) -> Self {
        Self { pool, generator }
    }

    /// Runs the full generation pipeline for one request
    ///
    /// Inserts a pending generation row, generates flashcards through the
    /// adapter, persists them, and marks the generation completed. On failure
    /// at any stage an error-log row is appended and (once the generation row
    /// exists) the generation's log status is set to `failed` before the
    /// error propagates.
    ///
    /// Calling this twice with identical input produces two distinct
    /// generations; nothing is deduplicated.
    #[instrument(skip(self, text), fields(user_id = %user_id, text_length = text.chars().count(), max_cards = %max_cards))]
    pub async fn create_generation(
        &self,
        user_id: &str,
        text: &str,
        max_cards: i32,
    ) -> Result<CreateGenerationResponseDto, GenerationError> {
        let text_length = text.chars().count() as i64;

        // Stage 1: generation row
        let generation = Generation::new(user_id.to_string(), text_length, max_cards);
        let generation_id = generation.get_id();
        if let Err(err) = repo::insert_generation(&self.pool, &generation) {
            self.log_error(&generation_id, GenerationErrorCode::DbInsertFailed, &err.to_string());
            return Err(GenerationError::RecordInsert(err));
        }

        // Stage 2: AI generation
        let flashcards = match self.generator.generate(text, max_cards).await {
            Ok(flashcards) => flashcards,
            Err(err) => {
                self.log_error(
                    &generation_id,
                    GenerationErrorCode::AiGenerationFailed,
                    &err.to_string(),
                );
                self.mark_failed(&generation_id);
                return Err(err.into());
            }
        };

        // Stage 3: persist the batch
        let rows: Vec<Flashcard> = flashcards
            .iter()
            .map(|card| card.to_flashcard(user_id, &generation_id))
            .collect();
        if let Err(err) = repo::insert_flashcards(&self.pool, &rows) {
            self.log_error(
                &generation_id,
                GenerationErrorCode::FlashcardsInsertFailed,
                &err.to_string(),
            );
            self.mark_failed(&generation_id);
            return Err(GenerationError::FlashcardsInsert);
        }

        // Stage 4: terminal status
        repo::update_generation_status(&self.pool, &generation_id, GenerationStatus::Completed)
            .map_err(GenerationError::Database)?;

        info!(
            "Generation {} completed with {} flashcards",
            generation_id,
            flashcards.len()
        );
        Ok(CreateGenerationResponseDto {
            generation_id,
            flashcards,
        })
    }

    /// Appends an error-log row; best effort, must never mask the original
    /// pipeline error
    fn log_error(&self, generation_id: &str, code: GenerationErrorCode, message: &str) {
        error!("Generation {} failed at {}: {}", generation_id, code.as_str(), message);
        if let Err(err) = repo::log_generation_error(&self.pool, generation_id, code, message) {
            error!("Failed to record generation error log: {}", err);
        }
    }

    /// Writes the terminal `failed` status; best effort for the same reason
    fn mark_failed(&self, generation_id: &str) {
        if let Err(err) =
            repo::update_generation_status(&self.pool, generation_id, GenerationStatus::Failed)
        {
            error!("Failed to mark generation {} as failed: {}", generation_id, err);
        }
    }
}
