//! For reading application configuration.

use serde::Deserialize;
use std::time::Duration;

/// Application configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ServerConfig {
    /// Server address.
    pub http_address: String,
    /// Server http port.
    pub http_port: u16,
    /// How long a request may take before it is aborted.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
    /// The maximum number of requests handled at once.
    pub concurrency_limit: usize,
}

/// Which [`ItemStore`](crate::api::inventory::item_store::ItemStore) to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// PostgreSQL through sqlx.
    Postgres,
    /// Keep everything in memory. Nothing survives a restart.
    Memory,
}

/// Database configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct DatabaseConfig {
    /// The store implementation.
    pub backend: StoreBackend,
    /// A full connection url. Takes precedence over the discrete fields below.
    pub url: Option<String>,
    /// The database username.
    pub username: String,
    /// The database password.
    pub password: String,
    /// The database port.
    pub port: u16,
    /// The database name.
    pub database_name: String,
    /// The database host.
    pub host: String,
    /// The maximum size of the connection pool.
    pub max_connections: u32,
    /// How long to wait for a pooled connection.
    #[serde(with = "humantime_serde")]
    pub acquire_timeout: Duration,
    /// Insert a couple of sample items into an empty store on startup.
    pub seed_sample_data: bool,
}

impl DatabaseConfig {
    /// The connection url with a `postgres://` scheme rewritten to `postgresql://`.
    pub fn normalized_url(&self) -> Option<String> {
        self.url.as_deref().map(|url| match url.strip_prefix("postgres://") {
            Some(rest) => format!("postgresql://{rest}"),
            None => url.to_string(),
        })
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct LoggingConfig {
    /// An [`EnvFilter`](tracing_subscriber::EnvFilter) directive. `RUST_LOG` wins if set.
    pub filter: String,
    /// Write JSON instead of human readable lines.
    pub json: bool,
    /// Also write JSON logs to hourly rotated files in this directory.
    pub directory: Option<String>,
    /// Export spans to an OpenTelemetry collector at this endpoint.
    pub otlp_endpoint: Option<String>,
}

/// Retrieve [`Config`] from the default configuration file and the environment.
///
/// The file is optional, every key has a default.
/// The plain `PORT` and `DATABASE_URL` variables are honored as well.
#[tracing::instrument]
pub fn load_config() -> color_eyre::Result<Config> {
    let config = config::Config::builder()
        .set_default("server.http_address", "0.0.0.0")?
        .set_default("server.http_port", 5000)?
        .set_default("server.request_timeout", "10s")?
        .set_default("server.concurrency_limit", 500)?
        .set_default("database.backend", "postgres")?
        .set_default("database.username", "postgres")?
        .set_default("database.password", "postgres")?
        .set_default("database.port", 5432)?
        .set_default("database.database_name", "inventory")?
        .set_default("database.host", "localhost")?
        .set_default("database.max_connections", 20)?
        .set_default("database.acquire_timeout", "5s")?
        .set_default("database.seed_sample_data", true)?
        .set_default("logging.filter", "info,tower_http=debug,stockroom=debug")?
        .set_default("logging.json", false)?
        .add_source(config::File::with_name("config").required(false))
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .set_override_option("server.http_port", std::env::var("PORT").ok())?
        .set_override_option("database.url", std::env::var("DATABASE_URL").ok())?
        .build()?
        .try_deserialize()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn database(url: Option<&str>) -> DatabaseConfig {
        DatabaseConfig {
            backend: StoreBackend::Postgres,
            url: url.map(str::to_string),
            username: "postgres".to_string(),
            password: "postgres".to_string(),
            port: 5432,
            database_name: "inventory".to_string(),
            host: "localhost".to_string(),
            max_connections: 5,
            acquire_timeout: Duration::from_secs(5),
            seed_sample_data: false,
        }
    }

    #[test]
    fn postgres_scheme_is_rewritten() {
        let config = database(Some("postgres://u:p@db:5432/inventory"));
        assert_eq!(
            Some("postgresql://u:p@db:5432/inventory".to_string()),
            config.normalized_url()
        );
    }

    #[test]
    fn postgresql_scheme_is_kept() {
        let config = database(Some("postgresql://db/inventory"));
        assert_eq!(
            Some("postgresql://db/inventory".to_string()),
            config.normalized_url()
        );
        assert_eq!(None, database(None).normalized_url());
    }

    #[test]
    fn defaults_are_complete() {
        let config = load_config().unwrap();
        assert!(config.server.concurrency_limit > 0);
        assert!(!config.logging.filter.is_empty());
    }
}
