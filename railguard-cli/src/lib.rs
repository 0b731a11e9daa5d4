//! Railguard CLI library: the input and output guardrail demos.
//!
//! This crate provides the command-line front end for the railguard
//! guardrail runner.

pub mod demo;

pub use demo::{Outcome, Providers, input_demo, output_demo};
