//! Unified error types for railguard.
//!
//! This module provides the error hierarchy covering:
//! - Completion provider errors (transport, authentication, malformed or
//!   schema-invalid responses)
//! - Agent runtime errors (guardrail tripwires, cancellation)

use std::fmt;

pub use crate::agent::AgentError;

/// Result type alias for railguard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for railguard.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Completion provider error.
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Agent runtime error, including guardrail tripwires.
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an agent runtime error with a message.
    #[must_use]
    pub fn agent(msg: impl Into<String>) -> Self {
        Self::Agent(AgentError::runtime(msg))
    }

    /// Returns `true` if this error is an input or output guardrail tripwire.
    #[must_use]
    pub const fn is_tripwire(&self) -> bool {
        matches!(
            self,
            Self::Agent(
                AgentError::InputGuardrailTriggered { .. }
                    | AgentError::OutputGuardrailTriggered { .. }
            )
        )
    }

    /// Returns `true` if this error came from the completion provider.
    ///
    /// Schema-validation failures count as provider errors.
    #[must_use]
    pub const fn is_provider_error(&self) -> bool {
        matches!(self, Self::Llm(_))
    }

    /// Returns `true` if the run was cancelled by the caller.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Agent(AgentError::Cancelled))
    }
}

/// Error type for completion provider operations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct LlmError {
    /// The error kind.
    pub kind: LlmErrorKind,
    /// The provider name (e.g., "openai", "mock").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider.
    pub code: Option<String>,
}

/// Categories of LLM errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum LlmErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit exceeded.
    RateLimited,
    /// Invalid request parameters.
    InvalidRequest,
    /// Response body could not be interpreted.
    ResponseFormat,
    /// Structured output did not conform to the declared schema.
    SchemaValidation,
    /// Network or connection error.
    Network,
    /// HTTP status error.
    HttpStatus,
    /// Provider-specific error.
    Provider,
    /// Internal error.
    Internal,
}

impl LlmError {
    const fn with_kind(kind: LlmErrorKind, message: String) -> Self {
        Self {
            kind,
            provider: None,
            message,
            code: None,
        }
    }

    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Auth, message.into()).for_provider(provider)
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>) -> Self {
        Self::with_kind(
            LlmErrorKind::RateLimited,
            "Rate limit exceeded. Please retry after some time.".into(),
        )
        .for_provider(provider)
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::InvalidRequest, message.into())
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(expected: impl Into<String>, got: impl Into<String>) -> Self {
        Self::with_kind(
            LlmErrorKind::ResponseFormat,
            format!("Expected {}, got {}", expected.into(), got.into()),
        )
    }

    /// Create a schema validation error for output named `schema`.
    #[must_use]
    pub fn schema_validation(schema: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(
            LlmErrorKind::SchemaValidation,
            format!(
                "Output does not match schema '{}': {}",
                schema.into(),
                message.into()
            ),
        )
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Network, message.into())
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        let mut err = Self::with_kind(
            LlmErrorKind::HttpStatus,
            format!("HTTP {status}: {}", body.into()),
        );
        err.code = Some(status.to_string());
        err
    }

    /// Create a provider-specific error.
    #[must_use]
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Provider, message.into()).for_provider(provider)
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_kind(LlmErrorKind::Internal, message.into())
    }

    /// Attach the provider name to this error.
    #[must_use]
    pub fn for_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Returns `true` if the structured output failed schema validation.
    #[must_use]
    pub const fn is_schema_validation(&self) -> bool {
        matches!(self.kind, LlmErrorKind::SchemaValidation)
    }
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for LlmError {}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else if err.is_decode() {
            Self::response_format("JSON body", err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Llm(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::http_status(502, "bad gateway").for_provider("openai");
        assert_eq!(err.to_string(), "[openai] HTTP 502: bad gateway (code: 502)");

        let err = LlmError::rate_limited("openai");
        assert_eq!(err.kind, LlmErrorKind::RateLimited);
        assert_eq!(err.provider.as_deref(), Some("openai"));
    }

    #[test]
    fn test_schema_validation_is_provider_error() {
        let err: Error = LlmError::schema_validation("MathOutput", "missing field `is_math`").into();
        assert!(err.is_provider_error());
        assert!(!err.is_tripwire());
        assert!(matches!(&err, Error::Llm(e) if e.is_schema_validation()));
        assert!(err.to_string().contains("MathOutput"));
    }

    #[test]
    fn test_cancelled_is_not_tripwire() {
        let err = Error::from(AgentError::Cancelled);
        assert!(err.is_cancelled());
        assert!(!err.is_tripwire());
        assert!(!err.is_provider_error());
    }
}
