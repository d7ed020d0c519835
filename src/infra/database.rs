//! For interacting with the database.

use super::config::{DatabaseConfig, StoreBackend};
use crate::api::inventory::{
    item_store::{SharedStore, StoreResult},
    memory_store::MemoryStore,
    pg_store::PgStore,
};
use sqlx::{
    pool::PoolOptions,
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions, PgPool,
};
use std::{str::FromStr, sync::Arc};
use tracing::log::LevelFilter;

/// A common database pool type.
pub type DbPool = PgPool;

/// Connects to the database based on some configuration.
///
/// The pool is lazy, no connection is made until the first query.
pub fn init_db(config: &DatabaseConfig) -> StoreResult<DbPool> {
    let db_options = match config.normalized_url() {
        Some(url) => PgConnectOptions::from_str(&url)?,
        None => PgConnectOptions::default()
            .username(&config.username)
            .password(&config.password)
            .host(&config.host)
            .port(config.port)
            .database(&config.database_name)
            .ssl_mode(PgSslMode::Prefer),
    };
    let db_options = db_options.log_statements(LevelFilter::Debug);
    let db: PgPool = PoolOptions::default()
        .acquire_timeout(config.acquire_timeout)
        .min_connections(1)
        .max_connections(config.max_connections)
        .connect_lazy_with(db_options);
    Ok(db)
}

/// Builds the configured store.
pub fn init_store(config: &DatabaseConfig) -> StoreResult<SharedStore> {
    let store: SharedStore = match config.backend {
        StoreBackend::Postgres => Arc::new(PgStore::new(init_db(config)?)),
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store, nothing will be persisted");
            Arc::new(MemoryStore::default())
        }
    };
    Ok(store)
}
