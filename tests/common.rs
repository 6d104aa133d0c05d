/// Common test utilities for Cardsmith integration tests
///
/// This file contains shared functions and utilities for all integration
/// tests, including test application setup, canned OpenRouter responses, and
/// helpers for seeding and querying flashcards.

use axum::{
    body::{to_bytes, Body},
    http::{Request, Response, StatusCode},
    Router,
};
use cardsmith::{
    create_app,
    db::{self, DbPool},
    models::{Flashcard, FlashcardSource, FlashcardStatus},
    repo,
    services::{FlashcardGenerator, GenerationService, OpenRouterClient, OpenRouterConfig},
    AppState, DEFAULT_USER_ID,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::Service;

/// A test application together with its database pool
///
/// The pool is exposed so tests can assert on persisted state directly,
/// which matters for outcomes the API deliberately hides (error-log rows,
/// terminal generation statuses after failures).
pub struct TestApp {
    pub app: Router,
    pub pool: Arc<DbPool>,
}

/// Creates a test application backed by an in-memory SQLite database
///
/// The chat-completion client is pointed at `chat_base_url`, which tests
/// provide from a wiremock server (or a closed port for tests that must not
/// reach the network).
///
/// Each test gets a uniquely named shared in-memory database: plain
/// ":memory:" would give every pooled connection its own empty database.
///
/// ### Arguments
///
/// * `chat_base_url` - Base URL for the OpenRouter-style API
///
/// ### Returns
///
/// A TestApp with all routes wired and migrations applied
pub fn create_test_app(chat_base_url: &str) -> TestApp {
    let database_url = format!("file:test_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = Arc::new(db::init_pool(&database_url));

    // Run migrations on the in-memory database to set up the schema
    let conn = &mut pool.get().unwrap();
    cardsmith::run_migrations(conn);

    // Wire the generation pipeline against the provided chat endpoint
    let chat_client = Arc::new(OpenRouterClient::new(OpenRouterConfig {
        api_key: "test-key".to_string(),
        base_url: chat_base_url.to_string(),
        default_model: "openai/gpt-4o-mini".to_string(),
        default_system_message: "You are a helpful AI assistant.".to_string(),
    }));
    let generator = Arc::new(FlashcardGenerator::new(chat_client));
    let generations = Arc::new(GenerationService::new(pool.clone(), generator));

    let app = create_app(AppState {
        pool: pool.clone(),
        generations,
    });

    TestApp { app, pool }
}

/// Builds source text of exactly `len` characters
///
/// The generation endpoint requires between 1000 and 10000 characters.
pub fn source_text(len: usize) -> String {
    "Spaced repetition schedules reviews at increasing intervals. "
        .chars()
        .cycle()
        .take(len)
        .collect()
}

/// Builds a chat-completion response body whose content is the given
/// flashcards payload, serialized the way OpenRouter returns it: as a JSON
/// string inside the first choice's message content
pub fn chat_completion_body(payload: &Value) -> Value {
    json!({
        "id": "gen-test-1",
        "model": "openai/gpt-4o-mini",
        "created": 1_700_000_000,
        "choices": [
            { "message": { "role": "assistant", "content": payload.to_string() } }
        ]
    })
}

/// Builds a flashcards payload with `count` well-formed cards
pub fn cards_payload(count: usize) -> Value {
    let cards: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "front": format!("Question {}", i),
                "back": format!("Answer {}", i)
            })
        })
        .collect();
    json!({ "flashcards": cards })
}

/// Sends a POST /generations request and returns the raw response
pub async fn post_generation(app: &mut Router, text: &str, max_cards: i32) -> Response<Body> {
    let request = Request::builder()
        .uri("/generations")
        .method("POST")
        .header("Content-Type", "application/json")
        .body(Body::from(
            serde_json::to_string(&json!({
                "text": text,
                "options": { "max_cards": max_cards }
            }))
            .unwrap(),
        ))
        .unwrap();

    app.call(request).await.unwrap()
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&body).unwrap()
}

/// Seeds a flashcard directly through the repository layer
///
/// Listing and editing tests need cards in known states without running the
/// generation pipeline. Each card's created_at is offset by `age_minutes` so
/// sort order is deterministic.
pub fn seed_flashcard(
    pool: &DbPool,
    front: &str,
    back: &str,
    status: FlashcardStatus,
    source: FlashcardSource,
    age_minutes: i64,
) -> Flashcard {
    let at = Utc::now() - Duration::minutes(age_minutes);
    let card = Flashcard::new_with_fields(
        uuid::Uuid::new_v4().to_string(),
        DEFAULT_USER_ID.to_string(),
        None,
        front.to_string(),
        back.to_string(),
        status,
        source,
        at,
        at,
    );
    repo::insert_flashcards(pool, std::slice::from_ref(&card)).unwrap();
    card
}

/// Sends a GET /flashcards request with the given query string
pub async fn list_flashcards(app: &mut Router, query: &str) -> Response<Body> {
    let uri = if query.is_empty() {
        "/flashcards".to_string()
    } else {
        format!("/flashcards?{}", query)
    };
    let request = Request::builder()
        .uri(uri)
        .method("GET")
        .body(Body::empty())
        .unwrap();

    app.call(request).await.unwrap()
}

/// Asserts that a response is an error with the given status and returns the
/// error message from the body
pub async fn assert_error(response: Response<Body>, expected_status: StatusCode) -> String {
    assert_eq!(response.status(), expected_status);
    let body = body_json(response).await;
    body["error"].as_str().expect("error body").to_string()
}
