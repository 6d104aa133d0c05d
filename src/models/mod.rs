/// Data models module
///
/// This module defines the core data structures used throughout the application.
/// It includes database models that map to database tables, as well as methods
/// for creating and manipulating these models.

// Re-export all model types
mod json_value;
pub use json_value::JsonValue;

mod generation;
pub use generation::{Generation, GenerationLog, GenerationStatus};

mod flashcard;
pub use flashcard::{Flashcard, FlashcardSource, FlashcardStatus};

mod error_log;
pub use error_log::{GenerationErrorCode, GenerationErrorLog};
