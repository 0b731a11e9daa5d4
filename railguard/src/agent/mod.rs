//! Agents and the guardrail-gated runner.
//!
//! - **[`Agent`]** is an immutable descriptor: instructions, an optional
//!   structured [`OutputSchema`], ordered input and output guardrails, and
//!   the model and provider it runs on.
//! - **[`Runner`]** is a stateless execution engine that drives one agent
//!   invocation: input guardrails, a single completion call, schema
//!   validation, output guardrails.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use railguard::agent::{Agent, RunConfig};
//!
//! let agent = Agent::new("Customer support agent")
//!     .instructions("You are a customer support agent. You help customers with their questions.")
//!     .provider(Arc::new(OpenAI::gemini(api_key)?));
//!
//! let result = agent.run("Hello?", RunConfig::default()).await?;
//! println!("{}", result.output);
//! ```

mod config;
pub mod error;
pub mod result;
mod runner;
mod schema;

pub use config::{Agent, DEFAULT_MODEL};
pub use error::AgentError;
pub use result::{RunConfig, RunResult};
pub use runner::Runner;
pub use schema::OutputSchema;
