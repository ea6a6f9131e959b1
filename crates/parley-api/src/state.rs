//! Application state wiring the chat service to its infrastructure.
//!
//! AppState holds the concrete service instance used by both the CLI and the
//! REST API. `ChatService` is generic over its store and responder; AppState
//! pins it to SQLite and the configured LLM provider.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use parley_core::chat::service::{ChatPolicy, ChatService};
use parley_core::llm::box_provider::BoxLlmProvider;
use parley_core::llm::responder::ProviderResponder;
use parley_infra::config::{load_global_config, resolve_data_dir};
use parley_infra::llm::responder_from_config;
use parley_infra::sqlite::pool::{DatabasePool, database_url};
use parley_infra::sqlite::session::SqliteSessionRepository;
use parley_types::config::GlobalConfig;

/// Responder pinned to a runtime-selected provider.
pub type ConcreteResponder = ProviderResponder<BoxLlmProvider>;

pub type ConcreteChatService = ChatService<SqliteSessionRepository, ConcreteResponder>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, open the DB, wire the service.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_global_config(&data_dir).await;

        let db_url = format!("{}?mode=rwc", database_url(&data_dir));
        let db_pool = DatabasePool::new(&db_url)
            .await
            .with_context(|| format!("Failed to open database at {db_url}"))?;

        let responder = responder_from_config(&config);
        Ok(Self::from_parts(config, data_dir, db_pool, responder))
    }

    /// Assemble state from already-built parts.
    pub fn from_parts(
        config: GlobalConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        responder: ConcreteResponder,
    ) -> Self {
        let policy = ChatPolicy::from_config(&config.chat);
        let chat_service = ChatService::new(
            SqliteSessionRepository::new(db_pool),
            responder,
            policy,
        );

        tracing::debug!(
            data_dir = %data_dir.display(),
            provider = %chat_service.responder().provider().name(),
            model = %chat_service.responder().provider().default_model(),
            "Application state initialized"
        );

        Self {
            chat_service: Arc::new(chat_service),
            config: Arc::new(config),
            data_dir,
        }
    }
}
