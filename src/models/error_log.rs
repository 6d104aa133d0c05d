use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies which pipeline stage a generation failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationErrorCode {
    /// The initial generation-row insert failed
    #[serde(rename = "DB_INSERT_FAILED")]
    DbInsertFailed,

    /// Inserting the generated flashcard rows failed
    #[serde(rename = "FLASHCARDS_INSERT_FAILED")]
    FlashcardsInsertFailed,

    /// The AI generation step failed (chat call or response validation)
    #[serde(rename = "AI_GENERATION_FAILED")]
    AiGenerationFailed,
}

impl GenerationErrorCode {
    /// Returns the code as the string stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationErrorCode::DbInsertFailed => "DB_INSERT_FAILED",
            GenerationErrorCode::FlashcardsInsertFailed => "FLASHCARDS_INSERT_FAILED",
            GenerationErrorCode::AiGenerationFailed => "AI_GENERATION_FAILED",
        }
    }
}

/// An append-only record of a generation pipeline failure
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::generation_error_logs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct GenerationErrorLog {
    /// Unique identifier for the log entry (UUID v4 as string)
    id: String,

    /// The ID of the generation this entry belongs to
    generation_id: String,

    /// Which stage failed (see [`GenerationErrorCode`])
    error_code: String,

    /// Free-text description of the failure
    error_message: String,

    /// Always "error"
    status: String,

    /// When this entry was created
    created_at: NaiveDateTime,
}

impl GenerationErrorLog {
    /// Creates a new error-log entry for a generation
    pub fn new(generation_id: String, code: GenerationErrorCode, message: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            generation_id,
            error_code: code.as_str().to_string(),
            error_message: message,
            status: "error".to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }

    /// Gets the entry's ID
    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    /// Gets the ID of the generation this entry belongs to
    pub fn get_generation_id(&self) -> String {
        self.generation_id.clone()
    }

    /// Gets the error code string
    pub fn get_error_code(&self) -> String {
        self.error_code.clone()
    }

    /// Gets the error message
    pub fn get_error_message(&self) -> String {
        self.error_message.clone()
    }

    /// Gets the entry's creation timestamp as a DateTime<Utc>
    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
