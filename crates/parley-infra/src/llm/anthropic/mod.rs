//! Anthropic Claude LLM provider implementation.
//!
//! [`AnthropicProvider`] implements the
//! [`LlmProvider`](parley_core::llm::provider::LlmProvider) trait for the
//! Anthropic Messages API.

pub mod client;
pub mod types;

pub use client::AnthropicProvider;
