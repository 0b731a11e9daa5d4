//! Railguard CLI - run the math guardrail demos against Gemini.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use railguard::agent::{DEFAULT_MODEL, RunConfig};
use railguard::providers::OpenAI;
use railguard::providers::openai::GEMINI_OPENAI_BASE_URL;
use railguard_cli::{Outcome, Providers, input_demo, output_demo};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Which guardrail demo to run.
#[derive(Debug, Subcommand)]
enum Demo {
    /// Input guardrail: refuse math homework before the agent answers
    Input {
        /// Message sent to the support agent
        #[arg(default_value = "Hello?")]
        prompt: String,
    },
    /// Output guardrail: withhold replies that contain math
    Output {
        /// Message sent to the support agent
        #[arg(default_value = "Hello, can you help me solve for x: 2x + 3 = 11?")]
        prompt: String,
    },
}

/// Railguard CLI - guardrail-gated customer support agent
#[derive(Parser, Debug)]
#[command(name = "railguard")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    demo: Demo,

    /// Model name
    #[arg(short, long, env = "RAILGUARD_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// OpenAI-compatible endpoint
    #[arg(long, env = "RAILGUARD_BASE_URL", default_value = GEMINI_OPENAI_BASE_URL)]
    base_url: String,

    /// API key for the endpoint
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Use scripted providers instead of the network
    #[arg(long)]
    offline: bool,

    /// Do not emit the agent_run tracing span
    #[arg(long)]
    tracing_disabled: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("railguard=debug,railguard_cli=debug")
    } else {
        EnvFilter::new("railguard=warn,railguard_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

impl Args {
    fn providers(&self, prompt: &str) -> anyhow::Result<Providers> {
        if self.offline {
            return Ok(match self.demo {
                Demo::Input { .. } => Providers::offline_input(prompt),
                Demo::Output { .. } => Providers::offline_output(prompt),
            });
        }

        let api_key = self
            .api_key
            .as_deref()
            .context("GEMINI_API_KEY not set; pass --api-key or use --offline")?;
        let client = OpenAI::builder()
            .api_key(api_key)
            .base_url(&self.base_url)
            .build()?;
        Ok(Providers::shared(Arc::new(client)))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    tracing::debug!(model = %args.model, offline = args.offline, "Starting demo");

    let config = RunConfig::new()
        .model(&args.model)
        .tracing_disabled(args.tracing_disabled);

    match &args.demo {
        Demo::Input { prompt } => {
            let providers = args.providers(prompt)?;
            match input_demo(&providers, prompt, config).await? {
                Outcome::InputTripped(result) => {
                    println!("Math homework guardrail tripped");
                    println!("{}", serde_json::to_string_pretty(&result.output.output_info)?);
                }
                Outcome::Passed(result) => {
                    println!("Guardrail didn't trip");
                    println!("{}", result.text().unwrap_or_default());
                }
                Outcome::OutputTripped(result) => {
                    println!("Unexpected output guardrail '{}'", result.guardrail_name);
                }
            }
        }
        Demo::Output { prompt } => {
            let providers = args.providers(prompt)?;
            match output_demo(&providers, prompt, config).await? {
                Outcome::OutputTripped(result) => {
                    println!("Math output guardrail tripped");
                    println!("{}", serde_json::to_string_pretty(&result.output.output_info)?);
                }
                Outcome::Passed(result) => {
                    println!("Guardrail didn't trip");
                    println!("{}", serde_json::to_string_pretty(&result.output)?);
                }
                Outcome::InputTripped(result) => {
                    println!("Unexpected input guardrail '{}'", result.guardrail_name);
                }
            }
        }
    }

    Ok(())
}
