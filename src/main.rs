//! The stockroom server.

use stockroom::{
    api::inventory::inventory_service,
    infra::{config, database, logging},
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let config = config::load_config()?;
    let _guard = logging::init_logging(&config.logging)?;

    let store = database::init_store(&config.database)?;
    inventory_service::initialize(store.as_ref(), config.database.seed_sample_data).await?;

    let listener = TcpListener::bind(format!(
        "{}:{}",
        config.server.http_address, config.server.http_port
    ))
    .await?;
    stockroom::app::run_app(listener, store, config).await?;

    Ok(())
}
