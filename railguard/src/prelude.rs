//! Commonly used types, for glob import.
//!
//! ```rust,ignore
//! use railguard::prelude::*;
//! ```

pub use crate::agent::{Agent, AgentError, OutputSchema, RunConfig, RunResult, Runner};
pub use crate::context::RunContext;
pub use crate::error::{Error, LlmError, Result};
pub use crate::guardrail::{
    AgentGuardrail, GuardrailOutput, InputGuardrail, InputGuardrailCheck, OutputGuardrail,
    OutputGuardrailCheck,
};
pub use crate::message::{Message, Role, UserInput};
pub use crate::providers::{ChatProvider, MockProvider, OpenAI, SharedChatProvider};
