//! Guardrail-gated execution engine.
//!
//! The [`Runner`] drives one [`Agent`] invocation through a fixed sequence:
//!
//! 1. Evaluate every input guardrail against the raw input
//! 2. Call the completion provider with the agent's instructions as the
//!    system directive and the input as user content
//! 3. Validate the response against the agent's output schema, if any
//! 4. Evaluate every output guardrail against the validated output
//! 5. Return the output
//!
//! A tripwire in step 1 ends the run before the provider is called; a
//! tripwire in step 4 discards the output. Provider and schema failures
//! end the run at step 2 or 3 and are never reported as tripwires.
//!
//! # Guardrail execution
//!
//! A classifier guardrail is itself a run of a (classifier) agent through
//! this same `Runner`, receiving the caller's [`RunContext`] unchanged.
//! Guardrails of one phase are evaluated concurrently and their results
//! are examined in declared order, so the outcome never depends on which
//! classifier answered first.

use std::future::Future;
use std::pin::Pin;

use futures::future::join_all;
use serde_json::Value;
use tracing::{Instrument, Span, debug, info, info_span};

use super::config::Agent;
use super::error::AgentError;
use super::result::{RunConfig, RunResult};
use crate::context::RunContext;
use crate::error::{Error, Result};
use crate::guardrail::{InputGuardrailResult, OutputGuardrailResult};
use crate::message::{Message, UserInput};
use crate::providers::{ChatProvider, ChatRequest, ResponseFormat, TokenUsage};

/// Stateless execution engine for guardrail-gated agent runs.
///
/// `Runner` owns no state; all per-run state lives in local variables.
/// Concurrent runs of the same agent share nothing but the agent itself.
#[derive(Debug, Clone, Copy)]
pub struct Runner;

impl Runner {
    /// Execute an agent run with an empty [`RunContext`].
    ///
    /// # Errors
    ///
    /// See [`Runner::run_with_context`].
    pub fn run<'a>(
        agent: &'a Agent,
        input: impl Into<UserInput>,
        config: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + 'a>> {
        let input = input.into();
        Box::pin(async move {
            let context = RunContext::new();
            Self::run_inner(agent, input, &context, config).await
        })
    }

    /// Execute an agent run with a caller-supplied context.
    ///
    /// The context is passed unchanged to every guardrail and from there
    /// to every nested classifier run. If it carries a cancellation token,
    /// cancelling the token aborts the run wherever it is suspended.
    ///
    /// # Errors
    ///
    /// - [`AgentError::InputGuardrailTriggered`] if an input guardrail trips;
    ///   the provider is not called.
    /// - [`AgentError::OutputGuardrailTriggered`] if an output guardrail
    ///   trips; the output is discarded.
    /// - [`Error::Llm`] for provider failures, including output that does
    ///   not match the agent's schema.
    /// - [`AgentError::Cancelled`] if the context's token is cancelled.
    /// - [`AgentError::Runtime`] if no provider is configured.
    /// - Any error raised by a guardrail check, unchanged.
    pub fn run_with_context<'a>(
        agent: &'a Agent,
        input: impl Into<UserInput>,
        context: &'a RunContext,
        config: RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<RunResult>> + Send + 'a>> {
        let input = input.into();
        Box::pin(Self::run_inner(agent, input, context, config))
    }

    async fn run_inner(
        agent: &Agent,
        input: UserInput,
        context: &RunContext,
        config: RunConfig,
    ) -> Result<RunResult> {
        if context.is_cancelled() {
            debug!(agent = %agent.name, "Run cancelled before start");
            return Err(AgentError::Cancelled.into());
        }

        let untraced;
        let (context, span) = if config.tracing_disabled || context.tracing_disabled() {
            untraced = context.untraced();
            (&untraced, Span::none())
        } else {
            (context, info_span!("agent_run", agent = %agent.name))
        };
        let run = Self::execute(agent, input, context, &config).instrument(span);

        match context.cancellation_token() {
            Some(token) => token.run_until_cancelled(run).await.unwrap_or_else(|| {
                debug!(agent = %agent.name, "Run cancelled");
                Err(AgentError::Cancelled.into())
            }),
            None => run.await,
        }
    }

    async fn execute(
        agent: &Agent,
        input: UserInput,
        context: &RunContext,
        config: &RunConfig,
    ) -> Result<RunResult> {
        let input_guardrail_results = Self::check_input(agent, &input, context).await?;

        let provider = config
            .provider
            .as_deref()
            .or(agent.provider.as_deref())
            .ok_or_else(|| {
                Error::agent(format!(
                    "Agent '{}' has no provider configured. Call .provider() before running.",
                    agent.name
                ))
            })?;
        let model = config.model.as_deref().unwrap_or(&agent.model);
        let (output, usage) = Self::complete(agent, provider, model, input).await?;

        let output_guardrail_results = Self::check_output(agent, &output, context).await?;

        debug!(agent = %agent.name, "Run completed");

        Ok(RunResult {
            output,
            agent_name: agent.name.clone(),
            model: model.to_owned(),
            usage,
            input_guardrail_results,
            output_guardrail_results,
        })
    }

    /// Evaluate all input guardrails; the first trip or error in declared
    /// order wins.
    async fn check_input(
        agent: &Agent,
        input: &UserInput,
        context: &RunContext,
    ) -> Result<Vec<InputGuardrailResult>> {
        if agent.input_guardrails.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = join_all(
            agent
                .input_guardrails
                .iter()
                .map(|g| g.run(context, agent, input)),
        )
        .await;

        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let result = outcome?;
            if result.is_triggered() {
                info!(
                    agent = %agent.name,
                    guardrail = %result.guardrail_name,
                    "Input guardrail tripwire triggered"
                );
                return Err(AgentError::InputGuardrailTriggered { result }.into());
            }
            results.push(result);
        }
        Ok(results)
    }

    /// Evaluate all output guardrails; the first trip or error in declared
    /// order wins.
    async fn check_output(
        agent: &Agent,
        output: &Value,
        context: &RunContext,
    ) -> Result<Vec<OutputGuardrailResult>> {
        if agent.output_guardrails.is_empty() {
            return Ok(Vec::new());
        }

        let outcomes = join_all(
            agent
                .output_guardrails
                .iter()
                .map(|g| g.run(context, agent, output)),
        )
        .await;

        let mut results = Vec::with_capacity(outcomes.len());
        for outcome in outcomes {
            let result = outcome?;
            if result.is_triggered() {
                info!(
                    agent = %agent.name,
                    guardrail = %result.guardrail_name,
                    "Output guardrail tripwire triggered"
                );
                return Err(AgentError::OutputGuardrailTriggered { result }.into());
            }
            results.push(result);
        }
        Ok(results)
    }

    /// Call the provider once and parse the response into the final output.
    async fn complete(
        agent: &Agent,
        provider: &dyn ChatProvider,
        model: &str,
        input: UserInput,
    ) -> Result<(Value, TokenUsage)> {
        let request = Self::build_request(agent, model, input);

        debug!(
            agent = %agent.name,
            provider = provider.provider_name(),
            model,
            "Requesting completion"
        );
        let response = provider.chat(&request).await?;
        let usage = response.usage.unwrap_or_default();

        let output = match &agent.output_schema {
            Some(schema) => schema
                .validate(response.content_or_empty())
                .map_err(|e| e.for_provider(provider.provider_name()))?,
            None => Value::String(response.content.unwrap_or_default()),
        };

        Ok((output, usage))
    }

    /// Build the [`ChatRequest`]: system directive, then the input messages.
    fn build_request(agent: &Agent, model: &str, input: UserInput) -> ChatRequest {
        let mut messages = Vec::new();
        if !agent.instructions.is_empty() {
            messages.push(Message::system(&agent.instructions));
        }
        messages.extend(input.into_messages());

        let request = ChatRequest::with_messages(model, messages);
        match &agent.output_schema {
            Some(schema) => request.response_format(ResponseFormat::JsonSchema {
                name: schema.name().to_owned(),
                schema: schema.json_schema().clone(),
            }),
            None => request,
        }
    }
}
