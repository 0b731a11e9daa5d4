//! Error types for agent runtime operations.
//!
//! [`AgentError`] covers the failure modes owned by the runner itself:
//! missing configuration, guardrail tripwires and cancellation. It
//! integrates into the global [`Error`](crate::Error) hierarchy via
//! `Error::Agent`.

use crate::guardrail::{GuardrailPhase, InputGuardrailResult, OutputGuardrailResult};

/// Error type for agent runtime operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AgentError {
    /// General agent runtime error with a descriptive message.
    #[error("{0}")]
    Runtime(String),

    /// An output schema descriptor was malformed.
    #[error("Invalid output schema '{name}': {reason}")]
    InvalidOutputSchema {
        /// Name of the rejected schema.
        name: String,
        /// Why the descriptor was rejected.
        reason: String,
    },

    /// Input guardrail tripwire was triggered before the agent ran.
    #[error("Input guardrail '{}' tripwire triggered", result.guardrail_name)]
    InputGuardrailTriggered {
        /// The result of the guardrail that tripped.
        result: InputGuardrailResult,
    },

    /// Output guardrail tripwire was triggered; the agent output was discarded.
    #[error("Output guardrail '{}' tripwire triggered", result.guardrail_name)]
    OutputGuardrailTriggered {
        /// The result of the guardrail that tripped.
        result: OutputGuardrailResult,
    },

    /// The run was cancelled through its context's cancellation token.
    #[error("Agent execution was cancelled")]
    Cancelled,
}

impl AgentError {
    /// Create a runtime error with a message.
    #[must_use]
    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Create an invalid schema error.
    #[must_use]
    pub fn invalid_output_schema(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOutputSchema {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// The phase whose guardrail tripped, if this is a tripwire.
    #[must_use]
    pub const fn guardrail_phase(&self) -> Option<GuardrailPhase> {
        match self {
            Self::InputGuardrailTriggered { .. } => Some(GuardrailPhase::Input),
            Self::OutputGuardrailTriggered { .. } => Some(GuardrailPhase::Output),
            _ => None,
        }
    }

    /// Diagnostic information of the tripped guardrail, if any.
    #[must_use]
    pub const fn tripwire_info(&self) -> Option<&serde_json::Value> {
        match self {
            Self::InputGuardrailTriggered { result } => Some(&result.output.output_info),
            Self::OutputGuardrailTriggered { result } => Some(&result.output.output_info),
            _ => None,
        }
    }
}
