use chrono::Utc;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::dto::GeneratedFlashcardDto;
use crate::models::{FlashcardSource, FlashcardStatus};
use crate::services::openrouter::{
    ChatClient, ChatCompletionParams, ChatMessage, OpenRouterError, ResponseFormat,
};

/// Turns raw text into exactly N validated flashcard values
///
/// Builds the domain prompt, delegates the call to the chat client, and
/// enforces the exact-count contract on the returned `flashcards` array.
/// Retries, if any, happen inside the chat client; this adapter performs
/// none of its own.
pub struct FlashcardGenerator {
    chat: Arc<dyn ChatClient>,
}

impl FlashcardGenerator {
    /// Creates a new generator on top of the given chat client
    pub fn new(chat: Arc<dyn ChatClient>) -> Self {
        Self { chat }
    }

    /// The JSON schema the model's response must conform to
    fn response_schema() -> Value {
        json!({
            "type": "object",
            "properties": {
                "flashcards": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "front": {
                                "type": "string",
                                "description": "The front side of the flashcard containing the question or concept"
                            },
                            "back": {
                                "type": "string",
                                "description": "The back side of the flashcard containing the answer or explanation"
                            }
                        },
                        "required": ["front", "back"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["flashcards"],
            "additionalProperties": false
        })
    }

    fn system_prompt(max_cards: i32) -> String {
        format!(
            "You are a helpful AI assistant that creates high-quality flashcards from provided text.\n\
             Your task is to create {max_cards} flashcards that cover the most important concepts from the text.\n\
             Each flashcard should have a clear question or concept on the front and a concise but comprehensive answer on the back.\n\
             Focus on key concepts, definitions, and relationships. Avoid trivial or redundant information.\n\
             Make sure each flashcard is self-contained and meaningful on its own.\n\
             IMPORTANT: You must return exactly {max_cards} flashcards, no more and no less.\n\
             IMPORTANT: Your response must be a valid JSON object with a 'flashcards' array containing exactly {max_cards} flashcard objects. The question is stored under the front key, the answer under the back key."
        )
    }

    /// Generates exactly `max_cards` flashcards from `text`
    ///
    /// Text length bounds are enforced by the HTTP layer before this is
    /// invoked.
    ///
    /// ### Errors
    ///
    /// Returns `InvalidRequest` if `max_cards` is less than 1. Propagates
    /// chat-client errors unchanged, and returns `InvalidResponse` when the
    /// model's payload is not an object, lacks a `flashcards` array, has the
    /// wrong number of entries, or contains an entry without non-blank string
    /// `front`/`back` content.
    #[instrument(skip(self, text), fields(text_length = text.len(), max_cards = %max_cards))]
    pub async fn generate(
        &self,
        text: &str,
        max_cards: i32,
    ) -> Result<Vec<GeneratedFlashcardDto>, OpenRouterError> {
        if max_cards < 1 {
            return Err(OpenRouterError::InvalidRequest(
                "max_cards must be at least 1".to_string(),
            ));
        }

        let params = ChatCompletionParams {
            messages: vec![ChatMessage::user(format!(
                "Please create {max_cards} flashcards from the following text. \
                 Format your response as a JSON object with a 'flashcards' array:\n\n{text}"
            ))],
            system_message: Some(Self::system_prompt(max_cards)),
            response_format: Some(ResponseFormat::json_object(Self::response_schema())),
            temperature: Some(0.7),
            ..Default::default()
        };

        let completion = self.chat.create_chat_completion(params).await?;
        debug!("Received chat completion {}", completion.id);

        // The chat client already parses JSON-looking strings; a string left
        // here means that parse fell through, so try once more and fail if
        // the content really isn't JSON.
        let payload = match completion.response {
            Value::String(text) => serde_json::from_str::<Value>(&text).map_err(|_| {
                OpenRouterError::InvalidResponse("response is not valid JSON".to_string())
            })?,
            other => other,
        };

        let object = payload.as_object().ok_or_else(|| {
            OpenRouterError::InvalidResponse("response must be an object".to_string())
        })?;

        let flashcards = object
            .get("flashcards")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                OpenRouterError::InvalidResponse("flashcards must be an array".to_string())
            })?;

        if flashcards.len() != max_cards as usize {
            return Err(OpenRouterError::InvalidResponse(format!(
                "expected {} flashcards but got {}",
                max_cards,
                flashcards.len()
            )));
        }

        // One timestamp for the whole batch
        let now = Utc::now();
        flashcards
            .iter()
            .enumerate()
            .map(|(index, card)| {
                // Validate the trimmed text so whitespace-only content is
                // rejected rather than persisted as an empty card side
                let front = card.get("front").and_then(Value::as_str).map(str::trim);
                let back = card.get("back").and_then(Value::as_str).map(str::trim);
                let (Some(front), Some(back)) = (front, back) else {
                    return Err(OpenRouterError::InvalidResponse(format!(
                        "flashcard at index {} must have front and back content as strings",
                        index
                    )));
                };
                if front.is_empty() || back.is_empty() {
                    return Err(OpenRouterError::InvalidResponse(format!(
                        "flashcard at index {} must have front and back content as strings",
                        index
                    )));
                }

                Ok(GeneratedFlashcardDto {
                    id: Uuid::new_v4().to_string(),
                    front: front.to_string(),
                    back: back.to_string(),
                    status: FlashcardStatus::Pending,
                    source: FlashcardSource::AiFull,
                    created_at: now,
                    updated_at: now,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::openrouter::ChatCompletionResponse;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Chat client that replays a canned result and records the parameters
    /// it was called with
    struct ScriptedChatClient {
        result: Mutex<Option<Result<ChatCompletionResponse, OpenRouterError>>>,
        last_params: Mutex<Option<ChatCompletionParams>>,
    }

    impl ScriptedChatClient {
        fn returning(response: Value) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Ok(ChatCompletionResponse {
                    id: "scripted".to_string(),
                    model: "test-model".to_string(),
                    created: 0,
                    response,
                    done: true,
                }))),
                last_params: Mutex::new(None),
            })
        }

        fn failing(err: OpenRouterError) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(Err(err))),
                last_params: Mutex::new(None),
            })
        }
    }

    #[async_trait]
    impl ChatClient for ScriptedChatClient {
        async fn create_chat_completion(
            &self,
            params: ChatCompletionParams,
        ) -> Result<ChatCompletionResponse, OpenRouterError> {
            *self.last_params.lock().unwrap() = Some(params);
            self.result
                .lock()
                .unwrap()
                .take()
                .expect("scripted client called more than once")
        }
    }

    fn cards_payload(count: usize) -> Value {
        let cards: Vec<Value> = (0..count)
            .map(|i| json!({ "front": format!("  question {i}  "), "back": format!("  answer {i}  ") }))
            .collect();
        json!({ "flashcards": cards })
    }

    fn assert_invalid_response(
        result: Result<Vec<GeneratedFlashcardDto>, OpenRouterError>,
        needle: &str,
    ) {
        match result {
            Err(OpenRouterError::InvalidResponse(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {}", msg)
            }
            other => panic!("expected InvalidResponse, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_generates_exactly_n_trimmed_pending_cards() {
        let chat = ScriptedChatClient::returning(cards_payload(5));
        let generator = FlashcardGenerator::new(chat.clone());

        let cards = generator.generate("some source text", 5).await.unwrap();

        assert_eq!(cards.len(), 5);
        for (i, card) in cards.iter().enumerate() {
            assert_eq!(card.front, format!("question {i}"));
            assert_eq!(card.back, format!("answer {i}"));
            assert_eq!(card.status, FlashcardStatus::Pending);
            assert_eq!(card.source, FlashcardSource::AiFull);
            assert!(Uuid::parse_str(&card.id).is_ok());
            // The whole batch shares one capture time
            assert_eq!(card.created_at, cards[0].created_at);
            assert_eq!(card.updated_at, card.created_at);
        }
    }

    #[tokio::test]
    async fn test_prompt_carries_count_and_schema() {
        let chat = ScriptedChatClient::returning(cards_payload(3));
        let generator = FlashcardGenerator::new(chat.clone());

        generator.generate("source", 3).await.unwrap();

        let params = chat.last_params.lock().unwrap().take().unwrap();
        let system = params.system_message.unwrap();
        assert!(system.contains("exactly 3 flashcards"));
        assert!(params.messages[0].content.contains("create 3 flashcards"));
        assert_eq!(params.temperature, Some(0.7));

        let format = params.response_format.unwrap();
        assert_eq!(format.format_type, "json_object");
        assert!(format.json_schema["properties"]["flashcards"].is_object());
    }

    #[tokio::test]
    async fn test_wrong_count_is_invalid_response() {
        let chat = ScriptedChatClient::returning(cards_payload(3));
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 5).await;
        assert_invalid_response(result, "expected 5 flashcards but got 3");
    }

    #[tokio::test]
    async fn test_missing_back_names_the_index() {
        let chat = ScriptedChatClient::returning(json!({
            "flashcards": [
                { "front": "q0", "back": "a0" },
                { "front": "q1" },
            ]
        }));
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 2).await;
        assert_invalid_response(result, "index 1");
    }

    #[tokio::test]
    async fn test_empty_front_is_rejected() {
        let chat = ScriptedChatClient::returning(json!({
            "flashcards": [{ "front": "", "back": "a0" }]
        }));
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 1).await;
        assert_invalid_response(result, "index 0");
    }

    #[tokio::test]
    async fn test_whitespace_only_front_is_rejected() {
        // Trimming would leave an empty card side, so blank text must fail
        // validation the same way an empty string does
        let chat = ScriptedChatClient::returning(json!({
            "flashcards": [{ "front": "   ", "back": "a0" }]
        }));
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 1).await;
        assert_invalid_response(result, "index 0");
    }

    #[tokio::test]
    async fn test_non_positive_max_cards_is_rejected_before_any_call() {
        let chat = ScriptedChatClient::returning(cards_payload(1));
        let generator = FlashcardGenerator::new(chat.clone());

        let result = generator.generate("source", 0).await;
        match result {
            Err(OpenRouterError::InvalidRequest(msg)) => {
                assert!(msg.contains("at least 1"), "unexpected message: {}", msg)
            }
            other => panic!("expected InvalidRequest, got {:?}", other.map(|_| ())),
        }

        // The chat client was never consulted
        assert!(chat.last_params.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_object_payload_is_rejected() {
        let chat = ScriptedChatClient::returning(json!([1, 2, 3]));
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 3).await;
        assert_invalid_response(result, "must be an object");
    }

    #[tokio::test]
    async fn test_missing_flashcards_array_is_rejected() {
        let chat = ScriptedChatClient::returning(json!({ "flashcards": "nope" }));
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 3).await;
        assert_invalid_response(result, "must be an array");
    }

    #[tokio::test]
    async fn test_string_payload_that_is_json_is_accepted() {
        // The chat client's parse can fall through and hand us a raw string
        let chat = ScriptedChatClient::returning(Value::String(
            cards_payload(2).to_string(),
        ));
        let generator = FlashcardGenerator::new(chat);

        let cards = generator.generate("source", 2).await.unwrap();
        assert_eq!(cards.len(), 2);
    }

    #[tokio::test]
    async fn test_string_payload_that_is_not_json_is_rejected() {
        let chat = ScriptedChatClient::returning(Value::String("prose, not JSON".to_string()));
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 2).await;
        assert_invalid_response(result, "not valid JSON");
    }

    #[tokio::test]
    async fn test_chat_client_errors_propagate_unchanged() {
        let chat = ScriptedChatClient::failing(OpenRouterError::Api { status: 502, body: None });
        let generator = FlashcardGenerator::new(chat);

        let result = generator.generate("source", 2).await;
        assert!(matches!(result, Err(OpenRouterError::Api { status: 502, .. })));
    }
}
