//! Application state shared by the API routers.

use mongodb::{Client, Database};

/// Cloned into each router (inexpensive: the MongoDB client shares its pool).
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    /// `None` when the users API runs on the in-memory store
    pub mongo: Option<MongoState>,
}

#[derive(Clone)]
pub struct MongoState {
    pub client: Client,
    pub db: Database,
}
