//! Agent descriptor.

use std::fmt;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use super::result::{RunConfig, RunResult};
use super::runner::Runner;
use super::schema::OutputSchema;
use crate::error::Result;
use crate::guardrail::{InputGuardrail, OutputGuardrail};
use crate::message::UserInput;
use crate::providers::SharedChatProvider;

/// Model used when neither the agent nor the run configuration names one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// An immutable description of an agent: instructions, optional output
/// schema, guardrails, and the model and provider it runs on.
///
/// Agents are built once with the fluent builder and then shared
/// read-only; cloning is cheap (guardrails and providers are
/// reference-counted). An `Agent` is not an execution; pass it to
/// [`Runner::run`] to get one.
#[derive(Clone)]
pub struct Agent {
    pub(crate) name: String,
    pub(crate) instructions: String,
    pub(crate) model: String,
    pub(crate) provider: Option<SharedChatProvider>,
    pub(crate) output_schema: Option<OutputSchema>,
    pub(crate) input_guardrails: Vec<InputGuardrail>,
    pub(crate) output_guardrails: Vec<OutputGuardrail>,
}

impl Agent {
    /// Create an agent with the given name and default settings.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instructions: String::new(),
            model: DEFAULT_MODEL.to_owned(),
            provider: None,
            output_schema: None,
            input_guardrails: Vec::new(),
            output_guardrails: Vec::new(),
        }
    }

    /// Set the system instructions.
    #[must_use]
    pub fn instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    /// Set the default model identifier.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the completion provider.
    #[must_use]
    pub fn provider(mut self, provider: SharedChatProvider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Declare the structured output schema.
    #[must_use]
    pub fn output_schema(mut self, schema: OutputSchema) -> Self {
        self.output_schema = Some(schema);
        self
    }

    /// Declare the output schema from a Rust type.
    #[must_use]
    pub fn output_type<T: JsonSchema + DeserializeOwned>(self) -> Self {
        self.output_schema(OutputSchema::of::<T>())
    }

    /// Append an input guardrail. Guardrails keep their declared order.
    #[must_use]
    pub fn input_guardrail(mut self, guardrail: InputGuardrail) -> Self {
        self.input_guardrails.push(guardrail);
        self
    }

    /// Append an output guardrail. Guardrails keep their declared order.
    #[must_use]
    pub fn output_guardrail(mut self, guardrail: OutputGuardrail) -> Self {
        self.output_guardrails.push(guardrail);
        self
    }

    /// The agent's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The system instructions.
    #[must_use]
    pub fn get_instructions(&self) -> &str {
        &self.instructions
    }

    /// The default model identifier.
    #[must_use]
    pub fn get_model(&self) -> &str {
        &self.model
    }

    /// The declared output schema, if any.
    #[must_use]
    pub const fn get_output_schema(&self) -> Option<&OutputSchema> {
        self.output_schema.as_ref()
    }

    /// Input guardrails in declared order.
    #[must_use]
    pub fn input_guardrails(&self) -> &[InputGuardrail] {
        &self.input_guardrails
    }

    /// Output guardrails in declared order.
    #[must_use]
    pub fn output_guardrails(&self) -> &[OutputGuardrail] {
        &self.output_guardrails
    }

    /// Run this agent with a default context.
    ///
    /// Shorthand for [`Runner::run`].
    ///
    /// # Errors
    ///
    /// See [`Runner::run`].
    pub async fn run(&self, input: impl Into<UserInput>, config: RunConfig) -> Result<RunResult> {
        Runner::run(self, input, config).await
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("has_provider", &self.provider.is_some())
            .field("output_schema", &self.output_schema)
            .field("input_guardrails", &self.input_guardrails)
            .field("output_guardrails", &self.output_guardrails)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RunContext;
    use crate::guardrail::GuardrailOutput;

    fn pass(_: &RunContext, _: &Agent, _: &UserInput) -> Result<GuardrailOutput> {
        Ok(GuardrailOutput::pass())
    }

    #[test]
    fn test_builder_defaults() {
        let agent = Agent::new("Customer support agent");
        assert_eq!(agent.name(), "Customer support agent");
        assert_eq!(agent.get_model(), DEFAULT_MODEL);
        assert!(agent.get_instructions().is_empty());
        assert!(agent.get_output_schema().is_none());
        assert!(agent.input_guardrails().is_empty());
        assert!(agent.output_guardrails().is_empty());
    }

    #[test]
    fn test_guardrails_keep_declared_order() {
        let agent = Agent::new("a")
            .instructions("You help customers.")
            .model("gpt-4o-mini")
            .input_guardrail(InputGuardrail::from_fn("first", pass))
            .input_guardrail(InputGuardrail::from_fn("second", pass));

        let names: Vec<_> = agent.input_guardrails().iter().map(InputGuardrail::name).collect();
        assert_eq!(names, ["first", "second"]);
        assert_eq!(agent.get_model(), "gpt-4o-mini");
    }
}
