//! Input guardrail types and traits.
//!
//! Input guardrails validate the raw run input before the agent's
//! completion call, so a rejected request never reaches the model.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::agent::Agent;
use crate::context::RunContext;
use crate::error::Result;
use crate::message::UserInput;

use super::GuardrailOutput;

/// Trait for implementing input guardrail check logic.
///
/// The [`check`](InputGuardrailCheck::check) method receives the run
/// context, the agent about to run, and the raw input it will be given.
#[async_trait]
pub trait InputGuardrailCheck: Send + Sync {
    /// Check the input and return a guardrail output.
    ///
    /// # Arguments
    ///
    /// * `context` — the caller's run context, to be passed on unchanged
    /// * `agent` — the agent being gated
    /// * `input` — the raw input about to be given to the agent
    async fn check(
        &self,
        context: &RunContext,
        agent: &Agent,
        input: &UserInput,
    ) -> Result<GuardrailOutput>;
}

struct FnCheck<F>(F);

#[async_trait]
impl<F> InputGuardrailCheck for FnCheck<F>
where
    F: Fn(&RunContext, &Agent, &UserInput) -> Result<GuardrailOutput> + Send + Sync,
{
    async fn check(
        &self,
        context: &RunContext,
        agent: &Agent,
        input: &UserInput,
    ) -> Result<GuardrailOutput> {
        (self.0)(context, agent, input)
    }
}

/// A named input guardrail.
///
/// Configured on an [`Agent`] and executed by the
/// [`Runner`](crate::agent::Runner) before the agent's completion call.
#[derive(Clone)]
pub struct InputGuardrail {
    /// Name of this guardrail (used in tracing and error messages).
    name: String,

    /// The guardrail check implementation.
    check: Arc<dyn InputGuardrailCheck>,
}

impl InputGuardrail {
    /// Create a new input guardrail with the given name and check logic.
    #[must_use]
    pub fn new(name: impl Into<String>, check: impl InputGuardrailCheck + 'static) -> Self {
        Self {
            name: name.into(),
            check: Arc::new(check),
        }
    }

    /// Create an input guardrail from a synchronous check function.
    ///
    /// ```rust,ignore
    /// let no_ssn = InputGuardrail::from_fn("no-ssn", |_ctx, _agent, input| {
    ///     Ok(if input.text().contains("SSN") {
    ///         GuardrailOutput::tripwire("PII detected")
    ///     } else {
    ///         GuardrailOutput::pass()
    ///     })
    /// });
    /// ```
    #[must_use]
    pub fn from_fn<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&RunContext, &Agent, &UserInput) -> Result<GuardrailOutput> + Send + Sync + 'static,
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
        input: &UserInput,
    ) -> Result<InputGuardrailResult> {
        debug!(guardrail = %self.name, agent = %agent.name(), "Evaluating input guardrail");
        let output = self.check.check(context, agent, input).await?;
        Ok(InputGuardrailResult {
            guardrail_name: self.name.clone(),
            output,
        })
    }
}

impl std::fmt::Debug for InputGuardrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputGuardrail")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// The result of running an input guardrail.
#[derive(Debug, Clone, PartialEq)]
pub struct InputGuardrailResult {
    /// Name of the guardrail that produced this result.
    pub guardrail_name: String,

    /// The guardrail check output.
    pub output: GuardrailOutput,
}

impl InputGuardrailResult {
    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.output.tripwire_triggered
    }
}
