//! LLM integration module.
//!
//! Provides an OpenAI-compatible client for LLM API calls and
//! the prompt used for candidate evaluation.

mod client;
mod prompts;

pub use client::{ChatCompletion, LlmClient, LlmResponse, Message, Role, TokenUsage};
pub use prompts::{build_prompt, Prompts};
