//! Guardrail demos.
//!
//! Both demos put a "Customer support agent" behind a classifier agent
//! that answers with a structured verdict:
//!
//! - **input**: the classifier decides whether the user wants their math
//!   homework done, before the support agent is called;
//! - **output**: the support agent answers in a `MessageOutput`, and the
//!   classifier decides whether the `response` contains math.

use std::sync::Arc;

use railguard::agent::{Agent, AgentError, RunConfig, RunResult, Runner};
use railguard::guardrail::{AgentGuardrail, InputGuardrailResult, OutputGuardrailResult};
use railguard::providers::{MockProvider, SharedChatProvider};
use railguard::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

const SUPPORT_AGENT: &str = "Customer support agent";
const SUPPORT_INSTRUCTIONS: &str =
    "You are a customer support agent. You help customers with their questions.";
const CLASSIFIER_AGENT: &str = "Guardrail check";

/// Verdict of the input classifier.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MathHomeworkOutput {
    /// Whether the user is asking for their math homework to be done.
    pub is_math_homework: bool,
    /// The classifier's explanation.
    pub reasoning: String,
}

/// Structured answer of the support agent in the output demo.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MessageOutput {
    /// Reply shown to the customer.
    pub response: String,
}

/// Verdict of the output classifier.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MathOutput {
    /// The classifier's explanation.
    pub reasoning: String,
    /// Whether the reply contains math.
    pub is_math: bool,
}

/// How a demo run ended.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Every guardrail passed.
    Passed(RunResult),
    /// An input guardrail tripped; the support agent was never called.
    InputTripped(InputGuardrailResult),
    /// An output guardrail tripped; the reply was withheld.
    OutputTripped(OutputGuardrailResult),
}

impl Outcome {
    /// Returns `true` if a guardrail tripped.
    #[must_use]
    pub const fn tripped(&self) -> bool {
        !matches!(self, Self::Passed(_))
    }
}

/// Providers for the support agent and its classifier.
#[derive(Clone)]
pub struct Providers {
    /// Provider of the support agent.
    pub primary: SharedChatProvider,
    /// Provider of the classifier agent.
    pub classifier: SharedChatProvider,
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers")
            .field("primary", &self.primary.provider_name())
            .field("classifier", &self.classifier.provider_name())
            .finish()
    }
}

impl Providers {
    /// Use one provider for both agents.
    #[must_use]
    pub fn shared(provider: SharedChatProvider) -> Self {
        Self {
            primary: Arc::clone(&provider),
            classifier: provider,
        }
    }

    /// Scripted providers for the input demo.
    ///
    /// The classifier flags prompts that look like arithmetic or algebra.
    #[must_use]
    pub fn offline_input(prompt: &str) -> Self {
        let is_math_homework = looks_like_math(prompt);
        let verdict = MathHomeworkOutput {
            is_math_homework,
            reasoning: if is_math_homework {
                "The user is asking for the answer to a math problem.".into()
            } else {
                "The user is not asking for math help.".into()
            },
        };
        Self {
            primary: Arc::new(MockProvider::fixed(
                "Hi! Thanks for reaching out. How can I help you today?",
            )),
            classifier: Arc::new(MockProvider::fixed(json!(verdict).to_string())),
        }
    }

    /// Scripted providers for the output demo.
    ///
    /// The support agent solves anything that looks like math, and the
    /// classifier flags exactly those replies.
    #[must_use]
    pub fn offline_output(prompt: &str) -> Self {
        let is_math = looks_like_math(prompt);
        let reply = MessageOutput {
            response: if is_math {
                "Subtract 3 from both sides to get 2x = 8, then divide by 2: x = 4.".into()
            } else {
                "I can help with that. Could you share a few more details?".into()
            },
        };
        let verdict = MathOutput {
            reasoning: if is_math {
                "The reply walks through solving an equation.".into()
            } else {
                "The reply contains no math.".into()
            },
            is_math,
        };
        Self {
            primary: Arc::new(MockProvider::fixed(json!(reply).to_string())),
            classifier: Arc::new(MockProvider::fixed(json!(verdict).to_string())),
        }
    }
}

/// Run the input guardrail demo.
///
/// # Errors
///
/// Returns provider and runtime errors; tripwires are reported as an
/// [`Outcome`].
pub async fn input_demo(providers: &Providers, prompt: &str, config: RunConfig) -> Result<Outcome> {
    let classifier = classifier(
        providers,
        &config,
        "Check if the user is asking you to do their math homework.",
    )
    .output_type::<MathHomeworkOutput>();
    let math_guardrail = AgentGuardrail::new(classifier, "is_math_homework")?
        .into_input_guardrail("math_guardrail");

    let agent = support_agent(providers).input_guardrail(math_guardrail);
    outcome(Runner::run(&agent, prompt, config).await)
}

/// Run the output guardrail demo.
///
/// # Errors
///
/// Returns provider and runtime errors; tripwires are reported as an
/// [`Outcome`].
pub async fn output_demo(
    providers: &Providers,
    prompt: &str,
    config: RunConfig,
) -> Result<Outcome> {
    let classifier = classifier(providers, &config, "Check if the output includes any math.")
        .output_type::<MathOutput>();
    let math_guardrail = AgentGuardrail::new(classifier, "is_math")?
        .candidate_field("response")
        .into_output_guardrail("math_guardrail");

    let agent = support_agent(providers)
        .output_type::<MessageOutput>()
        .output_guardrail(math_guardrail);
    outcome(Runner::run(&agent, prompt, config).await)
}

fn support_agent(providers: &Providers) -> Agent {
    Agent::new(SUPPORT_AGENT)
        .instructions(SUPPORT_INSTRUCTIONS)
        .provider(Arc::clone(&providers.primary))
}

fn classifier(providers: &Providers, config: &RunConfig, instructions: &str) -> Agent {
    let agent = Agent::new(CLASSIFIER_AGENT)
        .instructions(instructions)
        .provider(Arc::clone(&providers.classifier));
    match &config.model {
        Some(model) => agent.model(model),
        None => agent,
    }
}

fn outcome(result: Result<RunResult>) -> Result<Outcome> {
    match result {
        Ok(result) => Ok(Outcome::Passed(result)),
        Err(Error::Agent(AgentError::InputGuardrailTriggered { result })) => {
            Ok(Outcome::InputTripped(result))
        }
        Err(Error::Agent(AgentError::OutputGuardrailTriggered { result })) => {
            Ok(Outcome::OutputTripped(result))
        }
        Err(e) => Err(e),
    }
}

fn looks_like_math(text: &str) -> bool {
    let lower = text.to_lowercase();
    let has_digit = lower.chars().any(|c| c.is_ascii_digit());
    let has_operator = lower.chars().any(|c| "+-*/=^".contains(c));
    (has_digit && has_operator)
        || ["solve", "equation", "integral", "derivative"]
            .iter()
            .any(|word| lower.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_looks_like_math() {
        assert!(looks_like_math("What is 2+2?"));
        assert!(looks_like_math("Hello, can you help me solve for x: 2x + 3 = 11?"));
        assert!(!looks_like_math("Hello?"));
        assert!(!looks_like_math("Order #1234 never arrived"));
    }

    #[tokio::test]
    async fn test_offline_input_demo() {
        let greeting = input_demo(
            &Providers::offline_input("Hello?"),
            "Hello?",
            RunConfig::default(),
        )
        .await
        .unwrap();
        let Outcome::Passed(result) = greeting else {
            panic!("greeting should pass, got {greeting:?}");
        };
        assert!(result.text().is_some_and(|t| t.starts_with("Hi!")));

        let homework = input_demo(
            &Providers::offline_input("What is 2+2?"),
            "What is 2+2?",
            RunConfig::default(),
        )
        .await
        .unwrap();
        let Outcome::InputTripped(result) = homework else {
            panic!("homework should trip, got {homework:?}");
        };
        assert_eq!(result.guardrail_name, "math_guardrail");
        assert_eq!(result.output.output_info["is_math_homework"], true);
    }

    #[tokio::test]
    async fn test_offline_output_demo() {
        let prompt = "Hello, can you help me solve for x: 2x + 3 = 11?";
        let outcome = output_demo(&Providers::offline_output(prompt), prompt, RunConfig::default())
            .await
            .unwrap();
        let Outcome::OutputTripped(result) = outcome else {
            panic!("math reply should trip, got {outcome:?}");
        };
        assert!(result.agent_output["response"]
            .as_str()
            .is_some_and(|r| r.contains("x = 4")));

        let prompt = "Why was I charged twice?";
        let outcome = output_demo(&Providers::offline_output(prompt), prompt, RunConfig::default())
            .await
            .unwrap();
        assert!(!outcome.tripped());
    }

    #[tokio::test]
    async fn test_classifier_uses_configured_model() {
        let mock = Arc::new(MockProvider::fixed(
            r#"{"is_math_homework": false, "reasoning": "greeting"}"#,
        ));
        let providers = Providers::shared(Arc::clone(&mock) as _);

        input_demo(&providers, "Hello?", RunConfig::new().model("gemini-2.0-flash"))
            .await
            .unwrap();

        let models: Vec<_> = mock.requests().into_iter().map(|r| r.model).collect();
        assert_eq!(models, ["gemini-2.0-flash", "gemini-2.0-flash"]);
    }
}
