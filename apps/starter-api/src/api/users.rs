//! Users API routes
//!
//! Wires the users domain to the store picked by `USER_STORE`.

use crate::config::UserStoreKind;
use crate::state::AppState;
use axum::Router;
use domain_users::{InMemoryUserRepository, MongoUserRepository, UserService, handlers};
use tracing::info;

/// Create the users router on the configured store.
///
/// Fails when the MongoDB store is configured but no connection was made.
pub fn router(state: &AppState) -> eyre::Result<Router> {
    match (&state.mongo, state.config.user_store) {
        (Some(mongo), UserStoreKind::Mongo) => Ok(handlers::router(UserService::new(
            MongoUserRepository::new(&mongo.db),
        ))),
        (None, UserStoreKind::Mongo) => Err(eyre::eyre!(
            "USER_STORE=mongo but no MongoDB connection is available"
        )),
        (_, UserStoreKind::Memory) => {
            info!("Using the in-memory user store");
            Ok(handlers::router(UserService::new(InMemoryUserRepository::new())))
        }
    }
}

/// Initialize user indexes in MongoDB
pub async fn init_indexes(db: &mongodb::Database) -> eyre::Result<()> {
    MongoUserRepository::new(db)
        .init_indexes()
        .await
        .map_err(|e| eyre::eyre!("Failed to create user indexes: {}", e))?;
    info!("User collection indexes created");
    Ok(())
}
