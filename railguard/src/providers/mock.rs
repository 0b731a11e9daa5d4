//! Scripted provider for tests and offline runs.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use super::ChatProvider;
use super::types::{ChatRequest, ChatResponse};
use crate::error::{LlmError, Result};

#[derive(Debug)]
enum Script {
    /// Replies in order; the last one repeats once the rest are used.
    Replies(Vec<ChatResponse>),
    Fail(LlmError),
    /// Never resolves.
    Pending,
}

/// A [`ChatProvider`] that answers from a script and records every request.
///
/// ```rust,ignore
/// let classifier = Arc::new(MockProvider::fixed(r#"{"is_math": true, "reasoning": "algebra"}"#));
/// let agent = Agent::new("check").provider(classifier.clone());
/// // ...
/// assert_eq!(classifier.call_count(), 1);
/// ```
#[derive(Debug)]
pub struct MockProvider {
    script: Script,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockProvider {
    fn with_script(script: Script) -> Self {
        Self {
            script,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `content`.
    #[must_use]
    pub fn fixed(content: impl Into<String>) -> Self {
        Self::with_script(Script::Replies(vec![ChatResponse::text(content)]))
    }

    /// Answer with each item in turn, repeating the last one.
    #[must_use]
    pub fn sequence<I, S>(contents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_script(Script::Replies(
            contents.into_iter().map(ChatResponse::text).collect(),
        ))
    }

    /// Always answer with a full response (usage, model).
    #[must_use]
    pub fn response(response: ChatResponse) -> Self {
        Self::with_script(Script::Replies(vec![response]))
    }

    /// Fail every call with `error`.
    #[must_use]
    pub fn failing(error: LlmError) -> Self {
        Self::with_script(Script::Fail(error))
    }

    /// Never complete a call.
    #[must_use]
    pub fn pending() -> Self {
        Self::with_script(Script::Pending)
    }

    /// Number of completed or in-flight calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().len()
    }

    /// Copies of every request received, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ChatRequest>> {
        self.requests.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ChatProvider for MockProvider {
    fn provider_name(&self) -> &'static str {
        "mock"
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let index = {
            let mut requests = self.lock();
            requests.push(request.clone());
            requests.len() - 1
        };

        match &self.script {
            Script::Replies(replies) => {
                let reply = replies
                    .get(index)
                    .or_else(|| replies.last())
                    .cloned()
                    .ok_or_else(|| LlmError::provider("mock", "no scripted replies"))?;
                Ok(ChatResponse {
                    model: reply.model.or_else(|| Some(request.model.clone())),
                    ..reply
                })
            }
            Script::Fail(error) => Err(error.clone().into()),
            Script::Pending => std::future::pending().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    fn request() -> ChatRequest {
        ChatRequest::with_messages("mock-model", vec![Message::user("Hello?")])
    }

    #[tokio::test]
    async fn test_sequence_repeats_last_reply() {
        let mock = MockProvider::sequence(["first", "second"]);
        let replies = [
            mock.chat(&request()).await.unwrap(),
            mock.chat(&request()).await.unwrap(),
            mock.chat(&request()).await.unwrap(),
        ];
        assert_eq!(replies[0].content.as_deref(), Some("first"));
        assert_eq!(replies[1].content.as_deref(), Some("second"));
        assert_eq!(replies[2].content.as_deref(), Some("second"));
        assert_eq!(replies[2].model.as_deref(), Some("mock-model"));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_failing_records_request() {
        let mock = MockProvider::failing(LlmError::network("connection reset"));
        let err = mock.chat(&request()).await.unwrap_err();
        assert!(err.is_provider_error());
        assert_eq!(mock.requests()[0].messages[0].content, "Hello?");
    }

    #[tokio::test]
    async fn test_empty_sequence_is_provider_error() {
        let mock = MockProvider::sequence(Vec::<String>::new());
        tokio_test::assert_err!(mock.chat(&request()).await);
    }
}
