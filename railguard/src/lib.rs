#![cfg_attr(docsrs, feature(doc_cfg))]
//! Railguard runs LLM agents behind input and output guardrails.
//!
//! An [`Agent`](agent::Agent) carries instructions, an optional structured
//! output schema, and ordered lists of guardrails. The
//! [`Runner`](agent::Runner) checks the input before the model is called
//! and checks the output before it is returned; a tripped guardrail ends
//! the run with a distinct error per phase. Guardrails are plain functions
//! or other agents acting as classifiers
//! ([`AgentGuardrail`](guardrail::AgentGuardrail)).
//!
//! ```rust,ignore
//! use railguard::prelude::*;
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
//!         AgentGuardrail::new(classifier, "is_math_homework")?.into_input_guardrail("math_guardrail"),
//!     );
//!
//! match Runner::run(&agent, "What is 2+2?", RunConfig::default()).await {
//!     Err(Error::Agent(AgentError::InputGuardrailTriggered { result })) => { /* refused */ }
//!     other => { /* ... */ }
//! }
//! ```

pub mod agent;
pub mod context;
pub mod error;
pub mod guardrail;
pub mod message;
pub mod prelude;
pub mod providers;

pub use error::{Error, LlmError, LlmErrorKind, Result};
