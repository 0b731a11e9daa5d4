//! Guardrails backed by a classifier agent.

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::agent::{Agent, AgentError, RunConfig, Runner};
use crate::context::RunContext;
use crate::error::{Error, LlmError, Result};
use crate::message::UserInput;

use super::{
    GuardrailOutput, InputGuardrail, InputGuardrailCheck, OutputGuardrail, OutputGuardrailCheck,
};

/// A guardrail check that asks a classifier agent for a verdict.
///
/// The classifier is an ordinary [`Agent`] with a structured output
/// schema containing a boolean tripwire field. Evaluation is a nested
/// [`Runner`] invocation with the caller's [`RunContext`] passed through
/// unchanged:
///
/// - `tripwire_triggered` is the classifier's boolean tripwire field;
/// - `output_info` is the classifier's full structured output.
///
/// Errors from the nested run (provider failure, schema mismatch,
/// cancellation) propagate as-is.
///
/// The same value can gate either phase. As an output guardrail the
/// candidate text is the subject's output: a string is classified as-is,
/// [`candidate_field`](Self::candidate_field) selects a string field of a
/// structured output, and any other value is classified as its JSON text.
#[derive(Debug, Clone)]
pub struct AgentGuardrail {
    classifier: Agent,
    tripwire_field: String,
    candidate_field: Option<String>,
    run_config: RunConfig,
}

impl AgentGuardrail {
    /// Wrap `classifier`, tripping when its output's `tripwire_field` is `true`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Runtime`] if the classifier declares no output
    /// schema, or if its schema lists properties and `tripwire_field` is
    /// missing from them or declared with a non-boolean type.
    pub fn new(classifier: Agent, tripwire_field: impl Into<String>) -> Result<Self> {
        let tripwire_field = tripwire_field.into();
        let schema = classifier.get_output_schema().ok_or_else(|| {
            Error::agent(format!(
                "Classifier '{}' must declare an output schema",
                classifier.name()
            ))
        })?;

        if schema.has_properties() {
            let property = schema.property(&tripwire_field).ok_or_else(|| {
                AgentError::runtime(format!(
                    "Schema '{}' has no field `{tripwire_field}`",
                    schema.name()
                ))
            })?;
            if let Some(kind) = property.get("type").and_then(Value::as_str)
                && kind != "boolean"
            {
                return Err(AgentError::runtime(format!(
                    "Tripwire field `{tripwire_field}` of schema '{}' is {kind}, not boolean",
                    schema.name()
                ))
                .into());
            }
        }

        Ok(Self {
            classifier,
            tripwire_field,
            candidate_field: None,
            run_config: RunConfig::default(),
        })
    }

    /// Classify this string field of the subject's structured output.
    #[must_use]
    pub fn candidate_field(mut self, field: impl Into<String>) -> Self {
        self.candidate_field = Some(field.into());
        self
    }

    /// Run configuration for the nested classifier run.
    #[must_use]
    pub fn run_config(mut self, config: RunConfig) -> Self {
        self.run_config = config;
        self
    }

    /// The classifier agent's name.
    #[must_use]
    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Use this check as a named input guardrail.
    #[must_use]
    pub fn into_input_guardrail(self, name: impl Into<String>) -> InputGuardrail {
        InputGuardrail::new(name, self)
    }

    /// Use this check as a named output guardrail.
    #[must_use]
    pub fn into_output_guardrail(self, name: impl Into<String>) -> OutputGuardrail {
        OutputGuardrail::new(name, self)
    }

    async fn classify(&self, context: &RunContext, candidate: UserInput) -> Result<GuardrailOutput> {
        let result = Runner::run_with_context(
            &self.classifier,
            candidate,
            context,
            self.run_config.clone(),
        )
        .await?;

        let triggered = result
            .output
            .get(&self.tripwire_field)
            .and_then(Value::as_bool)
            .ok_or_else(|| {
                LlmError::schema_validation(
                    self.classifier
                        .get_output_schema()
                        .map_or(self.classifier.name(), |s| s.name()),
                    format!("field `{}` is missing or not a boolean", self.tripwire_field),
                )
            })?;

        debug!(
            classifier = %self.classifier_name(),
            triggered,
            "Classifier verdict"
        );

        Ok(GuardrailOutput {
            tripwire_triggered: triggered,
            output_info: result.output,
        })
    }

    fn candidate_text(&self, output: &Value) -> Result<String> {
        if let Some(field) = &self.candidate_field {
            return output
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| {
                    Error::agent(format!(
                        "Agent output has no string field `{field}` to classify"
                    ))
                });
        }

        match output {
            Value::String(text) => Ok(text.clone()),
            other => Ok(serde_json::to_string(other)?),
        }
    }
}

#[async_trait]
impl InputGuardrailCheck for AgentGuardrail {
    async fn check(
        &self,
        context: &RunContext,
        _agent: &Agent,
        input: &UserInput,
    ) -> Result<GuardrailOutput> {
        self.classify(context, input.clone()).await
    }
}

#[async_trait]
impl OutputGuardrailCheck for AgentGuardrail {
    async fn check(
        &self,
        context: &RunContext,
        _agent: &Agent,
        output: &Value,
    ) -> Result<GuardrailOutput> {
        let candidate = self.candidate_text(output)?;
        self.classify(context, candidate.into()).await
    }
}
