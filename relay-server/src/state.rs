//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::config::Config;
use crate::entities::SqliteStore;
use crate::inference::ScoringClient;
use crate::services::{ExchangePipeline, FeedbackReconciler};

pub type Pipeline = ExchangePipeline<ScoringClient, SqliteStore>;
pub type Reconciler = FeedbackReconciler<SqliteStore>;

/// State shared across all HTTP handlers. Built once at startup.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Conversation log, also probed by `/health`.
    pub store: Arc<SqliteStore>,
    pub pipeline: Arc<Pipeline>,
    pub reconciler: Arc<Reconciler>,
}

impl AppState {
    pub fn new(config: Config, inference: ScoringClient, store: SqliteStore) -> Self {
        let store = Arc::new(store);
        let pipeline = ExchangePipeline::new(
            Arc::new(inference),
            Arc::clone(&store),
            config.instructions.as_str(),
        );
        let reconciler = FeedbackReconciler::new(Arc::clone(&store));
        Self {
            config: Arc::new(config),
            store,
            pipeline: Arc::new(pipeline),
            reconciler: Arc::new(reconciler),
        }
    }
}
