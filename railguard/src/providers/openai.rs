//! OpenAI-compatible Chat Completions client.
//!
//! Works against OpenAI's own API and any compatible endpoint, such as
//! Gemini's OpenAI compatibility layer, Azure `OpenAI`, or local proxies.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Value, json};
use tracing::{debug, instrument};

use super::config::HttpClientConfig;
use super::types::{ChatRequest, ChatResponse, ResponseFormat, TokenUsage};
use super::{ChatProvider, saturating_u32};
use crate::error::{LlmError, Result};

/// Default `OpenAI` API base URL.
pub const OPENAI_API_BASE_URL: &str = "https://api.openai.com/v1";

/// Gemini's OpenAI-compatible base URL.
pub const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

const PROVIDER: &str = "openai";

/// OpenAI-compatible completion provider.
///
/// # Example
///
/// ```rust,ignore
/// use railguard::providers::OpenAI;
///
/// // From OPENAI_API_KEY / OPENAI_BASE_URL, or GEMINI_API_KEY
/// let provider = OpenAI::from_env()?;
///
/// // Gemini through its compatibility endpoint
/// let gemini = OpenAI::gemini("AIza...")?;
///
/// // Custom endpoint
/// let local = OpenAI::builder()
///     .api_key("sk-...")
///     .base_url("http://localhost:8080/v1")
///     .timeout_secs(30)
///     .build()?;
/// ```
#[derive(Clone)]
pub struct OpenAI {
    http_client: reqwest::Client,
    api_key: Arc<str>,
    base_url: Arc<str>,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl OpenAI {
    /// Create a client for the default `OpenAI` endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_key: impl Into<String>) -> std::result::Result<Self, LlmError> {
        Self::builder().api_key(api_key).build()
    }

    /// Create a client for Gemini's OpenAI-compatible endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn gemini(api_key: impl Into<String>) -> std::result::Result<Self, LlmError> {
        Self::builder()
            .api_key(api_key)
            .base_url(GEMINI_OPENAI_BASE_URL)
            .build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> OpenAIBuilder {
        OpenAIBuilder::default()
    }

    /// Create a client from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OPENAI_API_KEY`: API key for the `OpenAI` endpoint
    /// - `OPENAI_BASE_URL` (optional): custom base URL
    /// - `GEMINI_API_KEY`: used with the Gemini endpoint when
    ///   `OPENAI_API_KEY` is unset
    ///
    /// # Errors
    ///
    /// Returns an authentication error if neither key is set.
    pub fn from_env() -> std::result::Result<Self, LlmError> {
        let mut builder = if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            Self::builder().api_key(key)
        } else if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            Self::builder().api_key(key).base_url(GEMINI_OPENAI_BASE_URL)
        } else {
            return Err(LlmError::auth(
                PROVIDER,
                "neither OPENAI_API_KEY nor GEMINI_API_KEY is set",
            ));
        };

        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            builder = builder.base_url(base_url);
        }

        builder.build()
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);

        if let Ok(value) = HeaderValue::from_str(&format!("Bearer {}", self.api_key)) {
            headers.insert(AUTHORIZATION, value);
        }

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    /// Build the request body for the API.
    fn build_request_body(request: &ChatRequest) -> Value {
        let messages: Vec<Value> = request
            .messages
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();

        let mut body = json!({
            "model": request.model,
            "messages": messages,
        });

        if let Some(ResponseFormat::JsonSchema { name, schema }) = &request.response_format {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": sanitize_schema_name(name),
                    "schema": schema,
                    "strict": false,
                }
            });
        }

        body
    }

    /// Parse the API response into a [`ChatResponse`].
    fn parse_response(json: &Value) -> std::result::Result<ChatResponse, LlmError> {
        let message = json
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .ok_or_else(|| {
                LlmError::response_format("choices[0].message", json.to_string())
                    .for_provider(PROVIDER)
            })?;

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_owned);

        let usage = json.get("usage").map(|u| TokenUsage {
            input_tokens: saturating_u32(u["prompt_tokens"].as_u64().unwrap_or(0)),
            output_tokens: saturating_u32(u["completion_tokens"].as_u64().unwrap_or(0)),
        });

        Ok(ChatResponse {
            content,
            model: json
                .get("model")
                .and_then(Value::as_str)
                .map(str::to_owned),
            usage,
        })
    }

    /// Map a non-success HTTP status and body to an [`LlmError`].
    fn status_error(status: StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<Value>(body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_owned))
            .unwrap_or_else(|| body.to_owned());

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => LlmError::auth(PROVIDER, message),
            StatusCode::TOO_MANY_REQUESTS => LlmError::rate_limited(PROVIDER),
            StatusCode::BAD_REQUEST => LlmError::invalid_request(message).for_provider(PROVIDER),
            _ => LlmError::http_status(status.as_u16(), message).for_provider(PROVIDER),
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAI {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    #[instrument(skip(self, request), fields(model = %request.model))]
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let body = Self::build_request_body(request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        debug!(
            structured = request.response_format.is_some(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(&url)
            .headers(self.auth_headers())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &error_text).into());
        }

        let json: Value = response.json().await?;
        debug!(response = %json, "Chat completion response");
        Ok(Self::parse_response(&json)?)
    }
}

/// Provider schema names may only contain `[A-Za-z0-9_-]`.
fn sanitize_schema_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "output".to_owned()
    } else {
        cleaned
    }
}

/// Builder for [`OpenAI`].
#[derive(Debug, Default)]
pub struct OpenAIBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    http: HttpClientConfig,
}

impl OpenAIBuilder {
    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set a custom base URL.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: u64) -> Self {
        self.http.timeout_secs = Some(timeout);
        self
    }

    /// Set the user agent header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.http.user_agent = Some(user_agent.into());
        self
    }

    /// Replace the whole HTTP configuration.
    #[must_use]
    pub fn http_config(mut self, http: HttpClientConfig) -> Self {
        self.http = http;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if no API key was set, or an
    /// internal error if the HTTP client fails to build.
    pub fn build(self) -> std::result::Result<OpenAI, LlmError> {
        let api_key = self
            .api_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| LlmError::auth(PROVIDER, "API key is required"))?;
        let base_url = self
            .base_url
            .unwrap_or_else(|| OPENAI_API_BASE_URL.to_owned());
        let http_client = self.http.build_client()?;

        Ok(OpenAI {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LlmErrorKind;
    use crate::message::Message;

    #[test]
    fn test_client_builder() {
        let client = OpenAI::builder()
            .api_key("test-key")
            .base_url("https://custom.api.com/v1")
            .timeout_secs(30)
            .build()
            .unwrap();

        assert_eq!(client.base_url(), "https://custom.api.com/v1");
        assert!(!format!("{client:?}").contains("test-key"));
    }

    #[test]
    fn test_builder_requires_api_key() {
        let err = OpenAI::builder().build().unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Auth);
    }

    #[test]
    fn test_gemini_base_url() {
        let client = OpenAI::gemini("test-key").unwrap();
        assert_eq!(client.base_url(), GEMINI_OPENAI_BASE_URL);
    }

    #[test]
    fn test_request_body_with_schema() {
        let request = ChatRequest::with_messages(
            "gemini-2.5-flash",
            vec![Message::system("Classify."), Message::user("What is 2+2?")],
        )
        .response_format(ResponseFormat::JsonSchema {
            name: "Math Output".into(),
            schema: json!({ "type": "object" }),
        });

        let body = OpenAI::build_request_body(&request);
        assert_eq!(body["model"], "gemini-2.5-flash");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "What is 2+2?");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "Math_Output");
    }

    #[test]
    fn test_request_body_without_schema() {
        let request = ChatRequest::with_messages("gpt-4o-mini", vec![Message::user("Hello?")]);
        let body = OpenAI::build_request_body(&request);
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_parse_response() {
        let json = json!({
            "model": "gemini-2.5-flash",
            "choices": [{ "message": { "role": "assistant", "content": "Hi there" } }],
            "usage": { "prompt_tokens": 12, "completion_tokens": 3 }
        });
        let response = OpenAI::parse_response(&json).unwrap();
        assert_eq!(response.content.as_deref(), Some("Hi there"));
        assert_eq!(response.usage, Some(TokenUsage::new(12, 3)));
        assert_eq!(response.model.as_deref(), Some("gemini-2.5-flash"));
    }

    #[test]
    fn test_parse_response_without_choices() {
        let err = OpenAI::parse_response(&json!({ "object": "list" })).unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ResponseFormat);
    }

    #[test]
    fn test_status_errors() {
        let body = r#"{"error":{"message":"API key not valid"}}"#;
        let err = OpenAI::status_error(StatusCode::UNAUTHORIZED, body);
        assert_eq!(err.kind, LlmErrorKind::Auth);
        assert_eq!(err.message, "API key not valid");

        let err = OpenAI::status_error(StatusCode::TOO_MANY_REQUESTS, "");
        assert_eq!(err.kind, LlmErrorKind::RateLimited);

        let err = OpenAI::status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert_eq!(err.kind, LlmErrorKind::HttpStatus);
        assert_eq!(err.code.as_deref(), Some("502"));
    }
}
