/// Repository module
///
/// This module provides the data access layer for the application.
/// It contains functions for interacting with the database, including
/// creating, retrieving, and updating generations, flashcards, and
/// generation error logs.
///
/// The repository pattern abstracts away the details of database access
/// and provides a clean API for the rest of the application to use.

mod generation_repo;
mod flashcard_repo;
mod error_log_repo;

// Re-export all repository functions
pub use generation_repo::*;
pub use flashcard_repo::*;
pub use error_log_repo::*;
