//! Completion providers.
//!
//! A provider turns a [`ChatRequest`] (system directive, user content,
//! model identifier, optional structured-output schema) into a
//! [`ChatResponse`]. Everything about the wire protocol lives behind the
//! [`ChatProvider`] trait; the agent runner only sees requests and
//! responses.
//!
//! # Providers
//!
//! - **[`OpenAI`]**: any OpenAI-compatible Chat Completions endpoint,
//!   including Gemini's compatibility layer.
//! - **[`MockProvider`]**: scripted responses for tests and offline runs.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use railguard::providers::{OpenAI, SharedChatProvider};
//!
//! let provider: SharedChatProvider = Arc::new(OpenAI::from_env()?);
//! ```

mod config;
pub mod mock;
pub mod openai;
mod types;

pub use config::HttpClientConfig;
pub use mock::MockProvider;
pub use openai::OpenAI;
pub use types::{ChatRequest, ChatResponse, ResponseFormat, TokenUsage};

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;

/// The completion capability consumed by the runner.
///
/// Implementations must be `Send + Sync`; a single provider is shared by
/// every agent and every concurrent run that references it.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Short provider name used in logs and errors (e.g., "openai").
    fn provider_name(&self) -> &'static str;

    /// Perform one completion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Llm`](crate::Error::Llm) on transport,
    /// authentication, or response-format failures.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;
}

/// A shared, reference-counted provider.
pub type SharedChatProvider = Arc<dyn ChatProvider>;

/// Safely convert u64 to u32, saturating at `u32::MAX` if overflow.
#[inline]
#[must_use]
pub(crate) fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_u32() {
        assert_eq!(saturating_u32(0), 0);
        assert_eq!(saturating_u32(100), 100);
        assert_eq!(saturating_u32(u64::from(u32::MAX)), u32::MAX);
        assert_eq!(saturating_u32(u64::MAX), u32::MAX);
    }

    #[test]
    fn test_token_usage_add_saturates() {
        let mut usage = TokenUsage::new(u32::MAX - 1, 10);
        usage += TokenUsage::new(5, 5);
        assert_eq!(usage, TokenUsage::new(u32::MAX, 15));
        assert!(TokenUsage::default().is_empty());
    }
}
