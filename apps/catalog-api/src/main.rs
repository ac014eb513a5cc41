//! Catalog API - product catalog REST server

use axum_helpers::{CleanupCoordinator, create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::mongodb::connect_from_config_with_retry;
use std::time::Duration;
use tracing::{info, warn};

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    // Exhausting the retries ends the process before anything is served.
    let mongo_client = connect_from_config_with_retry(&config.mongodb, None).await?;
    let db = config.mongodb.select_database(&mongo_client);
    info!(database = db.name(), "Connected to MongoDB database");

    let cache = match database::redis::connect_from_config(&config.redis).await {
        Ok(manager) => Some(manager),
        Err(e) => {
            warn!(error = %e, "Redis unavailable, continuing without cache");
            None
        }
    };

    let state = AppState {
        config: config.clone(),
        mongo_client,
        db,
        cache,
    };

    api::init_indexes(&state).await?;

    let app = create_router::<openapi::ApiDoc>(api::routes(&state))?;

    let mut cleanup = CleanupCoordinator::new();
    let mongo_client = state.mongo_client.clone();
    cleanup.add_task("mongodb", async move {
        mongo_client.shutdown().await;
    });
    let cache = state.cache.clone();
    cleanup.add_task("redis", async move {
        drop(cache);
    });
    drop(state);

    info!(
        port = config.server.port,
        environment = ?config.environment,
        "Starting Catalog API"
    );

    create_production_app(app, &config.server, Duration::from_secs(30), cleanup.run())
        .await
        .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Catalog API shutdown complete");
    Ok(())
}
