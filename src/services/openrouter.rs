use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Maximum number of attempts per chat-completion call, including the first
const MAX_ATTEMPTS: u32 = 3;

/// Base delay for exponential backoff between attempts
const INITIAL_RETRY_DELAY: Duration = Duration::from_secs(1);

/// Errors produced by the chat-completion client
#[derive(Error, Debug)]
pub enum OpenRouterError {
    /// The request violated the input contract; nothing was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The API returned a non-2xx status
    #[error("API request failed with status {status}")]
    Api {
        status: u16,
        body: Option<String>,
    },

    /// The API response did not match the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request failed at the transport level
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl OpenRouterError {
    /// Whether the retry policy applies: rate limits, server errors, and
    /// network-class failures
    fn is_retryable(&self) -> bool {
        match self {
            OpenRouterError::Api { status, .. } => {
                *status == 429 || (500..600).contains(status)
            }
            OpenRouterError::Network(_) => true,
            _ => false,
        }
    }
}

/// The role of a chat message
///
/// Only caller roles are representable here; the system message is prepended
/// by the client itself, so an invalid role can't be smuggled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single message in a chat-completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// A structured-output descriptor for a chat-completion request
///
/// The only supported format type is `json_object`, carrying an object-typed
/// JSON schema with a non-empty properties map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: Value,
}

impl ResponseFormat {
    /// Creates a `json_object` response format with the given schema
    pub fn json_object(json_schema: Value) -> Self {
        Self {
            format_type: "json_object".to_string(),
            json_schema,
        }
    }
}

/// Parameters for a chat-completion call
#[derive(Debug, Clone, Default)]
pub struct ChatCompletionParams {
    /// The conversation so far, oldest first; must be non-empty
    pub messages: Vec<ChatMessage>,

    /// Model override; the client's configured default applies otherwise
    pub model: Option<String>,

    /// System message override; the configured default applies otherwise
    pub system_message: Option<String>,

    /// Structured-output descriptor
    pub response_format: Option<ResponseFormat>,

    /// Sampling temperature, between 0 and 2
    pub temperature: Option<f32>,

    /// Cap on generated tokens; must be positive
    pub max_tokens: Option<u32>,
}

/// The normalized envelope returned for a successful chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub model: String,
    pub created: i64,
    /// The first choice's message content: parsed JSON where the content
    /// looked like JSON and parsed cleanly, the raw string otherwise
    pub response: Value,
    pub done: bool,
}

/// The seam between domain adapters and the chat-completion transport
///
/// Lets callers swap the real [`OpenRouterClient`] for a scripted fake in
/// tests.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn create_chat_completion(
        &self,
        params: ChatCompletionParams,
    ) -> Result<ChatCompletionResponse, OpenRouterError>;
}

/// Configuration for the OpenRouter chat-completion client
#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    /// Bearer token for the API
    pub api_key: String,

    /// Base URL of the API, e.g. `https://openrouter.ai/api/v1`
    pub base_url: String,

    /// Model used when the caller does not specify one
    pub default_model: String,

    /// System message used when the caller does not supply one
    pub default_system_message: String,
}

/// Client for an OpenRouter-style `chat/completions` endpoint
///
/// Validates the request contract before any network I/O, retries transient
/// failures with exponential backoff, and normalizes the response envelope.
pub struct OpenRouterClient {
    http: reqwest::Client,
    config: OpenRouterConfig,
}

impl OpenRouterClient {
    /// Creates a new client with its own HTTP connection pool
    pub fn new(config: OpenRouterConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Sends a chat-completion request and returns the normalized envelope
    ///
    /// ### Errors
    ///
    /// * `InvalidRequest` if the input contract is violated (fails before any
    ///   network call)
    /// * `Api` for non-2xx responses that were not recovered by the retry
    ///   policy
    /// * `Network` for transport failures that were not recovered
    /// * `InvalidResponse` if the response body is missing the first choice's
    ///   message content
    #[instrument(skip(self, params), fields(messages = params.messages.len()))]
    pub async fn create_chat_completion(
        &self,
        params: ChatCompletionParams,
    ) -> Result<ChatCompletionResponse, OpenRouterError> {
        self.validate_params(&params)?;
        let body = self.format_request(&params);

        let mut attempt = 1u32;
        loop {
            match self.execute(&body).await {
                Ok(response) => return Ok(response),
                Err(err) if attempt < MAX_ATTEMPTS && err.is_retryable() => {
                    let delay = INITIAL_RETRY_DELAY * 2u32.pow(attempt - 1);
                    warn!(
                        "Chat completion attempt {} failed ({}), retrying in {:?}",
                        attempt, err, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }

    fn validate_params(&self, params: &ChatCompletionParams) -> Result<(), OpenRouterError> {
        if params.messages.is_empty() {
            return Err(OpenRouterError::InvalidRequest(
                "messages must be a non-empty array".to_string(),
            ));
        }
        for message in &params.messages {
            if message.content.trim().is_empty() {
                return Err(OpenRouterError::InvalidRequest(
                    "each message must have non-empty content".to_string(),
                ));
            }
        }

        if let Some(format) = &params.response_format {
            if format.format_type != "json_object" {
                return Err(OpenRouterError::InvalidRequest(
                    "response format type must be json_object".to_string(),
                ));
            }
            let Some(schema) = format.json_schema.as_object() else {
                return Err(OpenRouterError::InvalidRequest(
                    "response format must have a json_schema object".to_string(),
                ));
            };
            if schema.get("type").and_then(Value::as_str) != Some("object") {
                return Err(OpenRouterError::InvalidRequest(
                    "json_schema type must be object".to_string(),
                ));
            }
            let has_properties = schema
                .get("properties")
                .and_then(Value::as_object)
                .is_some_and(|properties| !properties.is_empty());
            if !has_properties {
                return Err(OpenRouterError::InvalidRequest(
                    "json_schema must have a non-empty properties object".to_string(),
                ));
            }
        }

        if let Some(temperature) = params.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(OpenRouterError::InvalidRequest(
                    "temperature must be a number between 0 and 2".to_string(),
                ));
            }
        }

        if params.max_tokens == Some(0) {
            return Err(OpenRouterError::InvalidRequest(
                "max_tokens must be a positive number".to_string(),
            ));
        }

        Ok(())
    }

    fn format_request(&self, params: &ChatCompletionParams) -> Value {
        let system_message = params
            .system_message
            .as_deref()
            .unwrap_or(&self.config.default_system_message);
        let model = params.model.as_deref().unwrap_or(&self.config.default_model);

        let mut messages = vec![serde_json::json!({
            "role": "system",
            "content": system_message,
        })];
        for message in &params.messages {
            messages.push(serde_json::json!({
                "role": message.role,
                "content": message.content,
            }));
        }

        let mut body = serde_json::json!({
            "model": model,
            "messages": messages,
            "stream": false,
        });
        if let Some(format) = &params.response_format {
            body["response_format"] = serde_json::json!({
                "type": format.format_type,
                "json_schema": format.json_schema,
            });
        }
        if let Some(temperature) = params.temperature {
            body["temperature"] = serde_json::json!(temperature);
        }
        if let Some(max_tokens) = params.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }
        body
    }

    async fn execute(&self, body: &Value) -> Result<ChatCompletionResponse, OpenRouterError> {
        debug!("Sending chat completion request");

        let response = self
            .http
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|text| !text.is_empty());
            return Err(OpenRouterError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: Value = response.json().await.map_err(|err| {
            OpenRouterError::InvalidResponse(format!("response body is not JSON: {}", err))
        })?;
        self.parse_response(raw)
    }

    fn parse_response(&self, raw: Value) -> Result<ChatCompletionResponse, OpenRouterError> {
        let content = raw
            .pointer("/choices/0/message/content")
            .cloned()
            .filter(|value| !value.is_null())
            .ok_or_else(|| {
                OpenRouterError::InvalidResponse("missing content in response".to_string())
            })?;

        let payload = match content {
            Value::String(text) => {
                // A string that starts with '{' or '[' is treated as JSON,
                // and a parse failure falls back to the raw string.
                let trimmed = text.trim();
                if trimmed.starts_with('{') || trimmed.starts_with('[') {
                    match serde_json::from_str::<Value>(trimmed) {
                        Ok(parsed) => parsed,
                        Err(err) => {
                            warn!(
                                "Content looks like JSON but failed to parse ({}), returning as string",
                                err
                            );
                            Value::String(text)
                        }
                    }
                } else {
                    Value::String(text)
                }
            }
            other => other,
        };

        Ok(ChatCompletionResponse {
            id: raw["id"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            model: raw["model"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| self.config.default_model.clone()),
            created: raw["created"].as_i64().unwrap_or_else(|| Utc::now().timestamp()),
            response: payload,
            done: true,
        })
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn create_chat_completion(
        &self,
        params: ChatCompletionParams,
    ) -> Result<ChatCompletionResponse, OpenRouterError> {
        OpenRouterClient::create_chat_completion(self, params).await
    }
}
