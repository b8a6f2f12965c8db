//! Backend entry-point: loads settings, migrates the schema and serves the
//! REST API.

use std::sync::Arc;

use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::example_data::{ExampleDataSeeder, ExampleDataSettings, seed_example_data_on_startup};
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{DbPool, DieselStore, PoolConfig, run_migrations};
use backend::server::{ServerConfig, create_server};
use backend::settings::Settings;

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = Settings::load().map_err(|e| {
        error!(error = %e, "failed to load settings");
        std::io::Error::other(e.to_string())
    })?;
    settings.validate().map_err(|e| {
        error!(error = %e, "invalid settings");
        std::io::Error::other(e)
    })?;

    let database_url = settings.database_url();
    run_migrations(&database_url, settings.database_migration_dir.as_deref())
        .await
        .map_err(std::io::Error::other)?;
    let pool = DbPool::new(PoolConfig::new(database_url))
        .await
        .map_err(std::io::Error::other)?;

    let http_state = HttpState::over_store(Arc::new(DieselStore::new(pool)), Arc::new(DefaultClock));

    let example_data = ExampleDataSettings::load().map_err(|e| {
        error!(error = %e, "failed to load example data settings");
        std::io::Error::other(e.to_string())
    })?;
    seed_example_data_on_startup(&example_data, &ExampleDataSeeder::from_state(&http_state))
        .await
        .map_err(std::io::Error::other)?;

    let config = ServerConfig::from(&settings);
    info!(addr = %config.bind_addr(), "starting HTTP server");
    create_server(http_state, &config)?.await
}
