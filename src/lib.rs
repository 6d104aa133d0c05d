/// Cardsmith: an AI-backed flashcard generation service
///
/// This library provides the core functionality for a flashcard-management
/// web application: users submit long-form text, an external LLM generates
/// flashcard candidates, and accepted cards are persisted alongside a record
/// of how they came to be.
///
/// ### Modules
///
/// - `db`: Database connection management
/// - `models`: Data structures for generations, flashcards, and error logs
/// - `repo`: Repository layer for database operations
/// - `services`: The generation pipeline (chat client, adapter, orchestrator)
/// - `schema`: Database schema definitions
///
/// ### Web API
///
/// The library exposes a RESTful API using Axum with the following endpoints:
///
/// - `POST /generations`: Generate flashcards from source text
/// - `GET /generations/{id}`: Get a generation and its lifecycle status
/// - `GET /flashcards`: List flashcards with filters and pagination
/// - `PATCH /flashcards/{id}`: Edit or accept/reject a flashcard
/// - `DELETE /flashcards/{id}`: Delete a flashcard

/// Database connection module
pub mod db;

/// Data models module
pub mod models;

/// Repository module for database operations
pub mod repo;

/// Database schema module
pub mod schema;

/// Generation pipeline services
pub mod services;

/// Web API handlers
pub mod handlers;

/// Data transfer objects
pub mod dto;

/// API error types
pub mod errors;

/// Configuration management
pub mod config;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// The single development user all rows are owned by
///
/// Authentication is delegated to an external collaborator and is out of
/// scope here; every request runs as this user.
pub const DEFAULT_USER_ID: &str = "00000000-0000-4000-8000-000000000000";

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// The database connection pool
    pub pool: Arc<db::DbPool>,

    /// The generation orchestrator
    pub generations: Arc<services::GenerationService>,
}

/// Creates the application router with all routes
///
/// This function sets up the Axum router with all the API endpoints.
///
/// ### Arguments
///
/// * `state` - The application state to be shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes and the application state
pub fn create_app(state: AppState) -> Router {
    Router::new()
        // Route for running the generation pipeline
        .route("/generations", post(handlers::create_generation_handler))
        // Route for getting a specific generation by ID
        .route("/generations/{id}", get(handlers::get_generation_handler))
        // Route for listing flashcards
        .route("/flashcards", get(handlers::list_flashcards_handler))
        // Routes for editing and deleting a specific flashcard
        .route(
            "/flashcards/{id}",
            patch(handlers::update_flashcard_handler).delete(handlers::delete_flashcard_handler),
        )
        // The front end runs on a different origin during development
        .layer(CorsLayer::permissive())
        // Add the application state
        .with_state(state)
}

/// Runs the embedded migrations
///
/// This function applies all database migrations to set up the schema.
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
///
/// ### Panics
///
/// This function will panic if the migrations fail to run
pub fn run_migrations(conn: &mut diesel::SqliteConnection) {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    // Define the embedded migrations
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    // Run all pending migrations
    conn.run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");
}
