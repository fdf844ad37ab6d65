//! Persistence layer.
//!
//! [`ConversationStore`] is the interface the services depend on. The default
//! implementation is [`SqliteStore`]. To swap to another database, implement
//! [`ConversationStore`] for the new type and change the concrete type in
//! [`crate::state::AppState`].
//!
//! Trait methods use `impl Future` in their signatures so no extra
//! `async-trait` crate is required.

pub mod conversation;
pub mod dao;

pub use conversation::ConversationStore;
pub use dao::{ConversationDocument, ConversationRecord, RecordKind};

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

/// Errors raised by a [`ConversationStore`].
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// SQLite-backed conversation log.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `url` and run pending migrations.
    ///
    /// `url` is a sqlx SQLite URL, e.g. `"sqlite://relay.db"`, or
    /// `"sqlite::memory:"` for tests. An in-memory database lives only as long
    /// as its connection, so use `max_connections = 1` with it.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let mut pool_options = SqlitePoolOptions::new().max_connections(max_connections.max(1));
        if url.contains(":memory:") {
            pool_options = pool_options.idle_timeout(None).max_lifetime(None);
        }
        let pool = pool_options.connect_with(options).await?;
        // Path is resolved relative to CARGO_MANIFEST_DIR at compile time.
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }
}
