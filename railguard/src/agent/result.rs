//! Run configuration and run results.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::Result;
use crate::guardrail::{InputGuardrailResult, OutputGuardrailResult};
use crate::providers::{SharedChatProvider, TokenUsage};

/// Per-run configuration.
///
/// Overrides apply to the agent passed to the runner only; nested
/// classifier runs use the configuration their guardrail was built with.
#[derive(Clone, Default)]
pub struct RunConfig {
    /// Model identifier overriding the agent's default.
    pub model: Option<String>,
    /// Provider overriding the agent's own.
    pub provider: Option<SharedChatProvider>,
    /// Suppress the `agent_run` tracing span for this run and the
    /// classifier runs nested under it.
    pub tracing_disabled: bool,
}

impl RunConfig {
    /// Create a default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Override the provider.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Enable or disable run tracing.
    #[must_use]
    pub const fn tracing_disabled(mut self, disabled: bool) -> Self {
        self.tracing_disabled = disabled;
        self
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("model", &self.model)
            .field(
                "provider",
                &self.provider.as_ref().map(|p| p.provider_name()),
            )
            .field("tracing_disabled", &self.tracing_disabled)
            .finish()
    }
}

/// The outcome of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// The final output: the schema-validated JSON value when the agent
    /// declares an output schema, otherwise the response text as a string.
    pub output: Value,
    /// Name of the agent that produced the output.
    pub agent_name: String,
    /// Model the completion was requested from.
    pub model: String,
    /// Token usage of the agent's own completion.
    pub usage: TokenUsage,
    /// Results of every input guardrail, in declared order.
    pub input_guardrail_results: Vec<InputGuardrailResult>,
    /// Results of every output guardrail, in declared order.
    pub output_guardrail_results: Vec<OutputGuardrailResult>,
}

impl RunResult {
    /// The final output as text, if it is a string.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.output.as_str()
    }

    /// Deserialize the final output into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the output does not
    /// fit `T`.
    pub fn final_output_as<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(T::deserialize(&self.output)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct MessageOutput {
        response: String,
    }

    fn result(output: Value) -> RunResult {
        RunResult {
            output,
            agent_name: "support".into(),
            model: "gemini-2.5-flash".into(),
            usage: TokenUsage::default(),
            input_guardrail_results: Vec::new(),
            output_guardrail_results: Vec::new(),
        }
    }

    #[test]
    fn test_final_output_as() {
        let run = result(json!({ "response": "I can help with billing." }));
        let typed: MessageOutput = run.final_output_as().unwrap();
        assert_eq!(typed.response, "I can help with billing.");
        assert!(run.text().is_none());

        assert!(run.final_output_as::<u32>().is_err());
    }

    #[test]
    fn test_text_output() {
        assert_eq!(result(json!("Hello!")).text(), Some("Hello!"));
    }

    #[test]
    fn test_run_config_builder() {
        let config = RunConfig::new().model("gemini-2.5-flash").tracing_disabled(true);
        assert_eq!(config.model.as_deref(), Some("gemini-2.5-flash"));
        assert!(config.tracing_disabled);
        assert!(format!("{config:?}").contains("provider: None"));
    }
}
