//! Guardrails: classifier-backed gates around agent input and output.
//!
//! A guardrail inspects a candidate value and yields a [`GuardrailOutput`]:
//! a `tripwire_triggered` flag plus structured evidence. Two kinds exist,
//! one per phase:
//!
//! - **[`InputGuardrail`]**: sees the raw input before the agent runs.
//!   A tripwire aborts the run with
//!   [`AgentError::InputGuardrailTriggered`](crate::agent::AgentError) and
//!   the completion provider is never called.
//! - **[`OutputGuardrail`]**: sees the agent's final output, after it has
//!   been validated against the agent's output schema. A tripwire aborts
//!   with [`AgentError::OutputGuardrailTriggered`](crate::agent::AgentError)
//!   and the output is discarded.
//!
//! # Ordering
//!
//! All guardrails of a phase are evaluated, concurrently. Their results
//! are then examined in declared order, so the first guardrail in the
//! agent's list that trips (or fails) decides the outcome regardless of
//! which one finished first.
//!
//! # Classifier guardrails
//!
//! [`AgentGuardrail`] delegates to a private classifier [`Agent`](crate::agent::Agent)
//! through the same [`Runner`](crate::agent::Runner) and reads a boolean
//! field of its structured output:
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct MathHomeworkOutput { is_math_homework: bool, reasoning: String }
//!
//! let classifier = Agent::new("Guardrail check")
//!     .instructions("Check if the user is asking you to do their math homework.")
//!     .output_type::<MathHomeworkOutput>()
//!     .provider(provider.clone());
//!
//! let agent = Agent::new("Customer support agent")
//!     .instructions("You are a customer support agent.")
//!     .provider(provider)
//!     .input_guardrail(
//!         AgentGuardrail::new(classifier, "is_math_homework")?.into_input_guardrail("math"),
//!     );
//! ```

mod classifier;
mod input;
mod output;

pub use classifier::AgentGuardrail;
pub use input::{InputGuardrail, InputGuardrailCheck, InputGuardrailResult};
pub use output::{OutputGuardrail, OutputGuardrailCheck, OutputGuardrailResult};

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The phase a guardrail gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuardrailPhase {
    /// Before the agent produces output.
    Input,
    /// After the agent produced its final output.
    Output,
}

impl fmt::Display for GuardrailPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Input => "input",
            Self::Output => "output",
        })
    }
}

/// The output of a guardrail check.
///
/// Contains the tripwire flag and structured information about the check,
/// typically the classifier's full structured output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardrailOutput {
    /// Whether the tripwire was triggered.
    pub tripwire_triggered: bool,

    /// Structured evidence supporting the decision.
    pub output_info: Value,
}

impl GuardrailOutput {
    /// Create a passing guardrail output (tripwire not triggered).
    #[must_use]
    pub const fn pass() -> Self {
        Self {
            tripwire_triggered: false,
            output_info: Value::Null,
        }
    }

    /// Create a failing guardrail output (tripwire triggered).
    #[must_use]
    pub fn tripwire(info: impl Into<Value>) -> Self {
        Self {
            tripwire_triggered: true,
            output_info: info.into(),
        }
    }

    /// Create a passing output that still records diagnostic information.
    #[must_use]
    pub fn pass_with_info(info: impl Into<Value>) -> Self {
        Self {
            tripwire_triggered: false,
            output_info: info.into(),
        }
    }

    /// Returns `true` if the tripwire was triggered.
    #[must_use]
    pub const fn is_triggered(&self) -> bool {
        self.tripwire_triggered
    }
}

/// Convenience conversion: a string becomes a tripwire output.
impl From<&str> for GuardrailOutput {
    fn from(reason: &str) -> Self {
        Self::tripwire(Value::String(reason.to_owned()))
    }
}
