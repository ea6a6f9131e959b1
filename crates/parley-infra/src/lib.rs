//! Infrastructure layer for Parley.
//!
//! Contains implementations of the port traits defined in `parley-core`:
//! SQLite session storage, LLM provider clients, environment-backed API key
//! lookup, and the `config.toml` loader.

pub mod config;
pub mod llm;
pub mod secret;
pub mod sqlite;
