//! Chat session orchestration.
//!
//! - `repository`: the `SessionRepository` port
//! - `service`: `ChatService`, the orchestrator
//! - `title`: auto-title policy for freshly started sessions
//! - `lock`: per-session mutation serialization

pub mod lock;
pub mod repository;
pub mod service;
pub mod title;
