//! Shared domain types for Parley.
//!
//! This crate contains the domain types used across the workspace: chat
//! sessions and messages, LLM request/response shapes, configuration, and
//! the error taxonomy.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
