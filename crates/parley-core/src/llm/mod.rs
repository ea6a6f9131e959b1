//! LLM provider abstractions for Parley.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: object-safe wrapper for runtime provider selection
//! - `AiResponder`: the history-in, text-out contract the orchestrator consumes

pub mod box_provider;
pub mod provider;
pub mod responder;
