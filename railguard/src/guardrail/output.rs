//! Output guardrail types and traits.
//!
//! Output guardrails validate the agent's final, schema-conforming output
//! before it is returned to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::agent::Agent;
use crate::context::RunContext;
use crate::error::Result;

use super::GuardrailOutput;

/// Trait for implementing output guardrail check logic.
///
/// The [`check`](OutputGuardrailCheck::check) method receives the run
/// context, the agent that produced the output, and the output itself.
#[async_trait]
pub trait OutputGuardrailCheck: Send + Sync {
    /// Check the agent's final output and return a guardrail output.
    ///
    /// # Arguments
    ///
    /// * `context` — the caller's run context, to be passed on unchanged
    /// * `agent` — the agent that produced the output
    /// * `output` — the final output value (already schema-validated)
    async fn check(
        &self,
        context: &RunContext,
        agent: &Agent,
        output: &Value,
    ) -> Result<GuardrailOutput>;
}

struct FnCheck<F>(F);

#[async_trait]
impl<F> OutputGuardrailCheck for FnCheck<F>
where
    F: Fn(&RunContext, &Agent, &Value) -> Result<GuardrailOutput> + Send + Sync,
{
    async fn check(
        &self,
        context: &RunContext,
        agent: &Agent,
        output: &Value,
    ) -> Result<GuardrailOutput> {
        (self.0)(context, agent, output)
    }
}

/// A named output guardrail.
///
/// If any configured output guardrail trips, the run returns an error and
/// the output is not delivered.
#[derive(Clone)]
pub struct OutputGuardrail {
    /// Name of this guardrail (used in tracing and error messages).
    name: String,

    /// The guardrail check implementation.
    check: Arc<dyn OutputGuardrailCheck>,
}

impl OutputGuardrail {
    /// Create a new output guardrail with the given name and check logic.
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl OutputGuardrailCheck + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Create an output guardrail from a synchronous check function.
    #[must_use]
    pub fn from_fn<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RunContext, &Agent, &Value) -> Result<GuardrailOutput> + Send + Sync + 'static,
    {
        Self::new(name, FnCheck(check))
    }

    /// Returns the name of this guardrail.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execute this guardrail check.
    ///
    /// # Errors
    ///
    /// Propagates any error raised by the check unchanged.
    pub async fn run(
        &self,
        context: &RunContext,
        agent: &Agent,
        output: &Value,
    ) -> Result<OutputGuardrailResult> {
        debug!(guardrail = %self.name, agent = %agent.name(), "Evaluating output guardrail");
        let guardrail_output = self.check.check(context, agent, output).await?;
        Ok(OutputGuardrailResult {
            guardrail_name: self.name.clone(),
            agent_output: output.clone(),
            output: guardrail_output,
        })
    }
}

impl std::fmt::Debug for OutputGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputGuardrail")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The result of running an output guardrail.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputGuardrailResult {
    /// Name of the guardrail that produced this result.
    pub guardrail_name: String,

    /// The agent output that was checked.
    pub agent_output: Value,

    /// The guardrail check output.
    pub output: GuardrailOutput,
}

impl OutputGuardrailResult {
    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.output.tripwire_triggered
    }
}
