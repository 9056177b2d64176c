use axum_helpers::server::{create_production_app, health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::{Config, UserStoreKind};
use state::{AppState, MongoState};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Install color-eyre first for colored error output
    install_color_eyre();

    let config = Config::from_env()?;

    init_tracing(&config.environment);

    let mongo = match config.user_store {
        UserStoreKind::Mongo => {
            info!("Connecting to MongoDB at {}", config.mongodb.redacted_url());

            let client =
                database::mongodb::connect_from_config_with_retry(&config.mongodb, None).await?;
            let db = client.database(config.mongodb.database());

            info!(
                "Successfully connected to MongoDB database: {}",
                config.mongodb.database()
            );

            api::users::init_indexes(&db).await?;
            Some(MongoState { client, db })
        }
        UserStoreKind::Memory => None,
    };

    let state = AppState { config, mongo };

    let api_routes = api::routes(&state)?;

    // Create a router with OpenAPI docs
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api_routes).await?;

    // Liveness at `/` and `/health`, readiness at `/ready`
    let app = router
        .merge(health_router(state.config.app.clone()))
        .merge(api::health::router(state.clone()));

    info!(
        store = %state.config.user_store,
        "Starting Starter API with graceful shutdown (30s timeout)"
    );

    let server_config = state.config.server.clone();
    create_production_app(app, &server_config, Duration::from_secs(30), async move {
        if let Some(mongo) = state.mongo {
            info!("Shutting down: closing MongoDB connections");
            mongo.client.shutdown().await;
            info!("MongoDB connection closed successfully");
        }
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Starter API shutdown complete");
    Ok(())
}
