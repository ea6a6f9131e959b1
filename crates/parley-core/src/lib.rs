//! Chat orchestration and port trait definitions for Parley.
//!
//! This crate defines the "ports" (store and provider traits) that the
//! infrastructure layer implements, and the `ChatService` use case that
//! sequences store reads/writes around the AI call. It depends only on
//! `parley-types` -- never on `parley-infra` or any database/HTTP crate.

pub mod chat;
pub mod llm;
