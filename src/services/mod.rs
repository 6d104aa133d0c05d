/// Services module
///
/// The generation pipeline lives here, in three layers:
///
/// - `openrouter`: the chat-completion client wrapping the external LLM API,
///   including request validation and transport-level retry
/// - `flashcard_generator`: the adapter translating "N flashcards from this
///   text" into a chat-completion call and validating what comes back
/// - `generation`: the orchestrator sequencing persistence around the
///   adapter and owning error logging

pub mod openrouter;
pub use openrouter::{
    ChatClient, ChatCompletionParams, ChatCompletionResponse, ChatMessage, ChatRole,
    OpenRouterClient, OpenRouterConfig, OpenRouterError, ResponseFormat,
};

mod flashcard_generator;
pub use flashcard_generator::FlashcardGenerator;

mod generation;
pub use generation::{GenerationError, GenerationService};
