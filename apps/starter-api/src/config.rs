use core_config::{AppInfo, FromEnv, app_info, env_parse_or, server::ServerConfig};
use database::mongodb::MongoConfig;
use std::fmt;
use std::str::FromStr;

pub use core_config::Environment;

/// Backing store for the users API, from `USER_STORE`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UserStoreKind {
    #[default]
    Mongo,
    /// Process-local map; data is lost on restart
    Memory,
}

impl FromStr for UserStoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mongo" | "mongodb" => Ok(UserStoreKind::Mongo),
            "memory" | "in-memory" => Ok(UserStoreKind::Memory),
            other => Err(format!("expected 'mongo' or 'memory', got '{}'", other)),
        }
    }
}

impl fmt::Display for UserStoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserStoreKind::Mongo => write!(f, "mongo"),
            UserStoreKind::Memory => write!(f, "memory"),
        }
    }
}

/// Application-specific configuration
/// Composes shared config components from the `config` library
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub user_store: UserStoreKind,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let user_store = env_parse_or("USER_STORE", UserStoreKind::default())?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            user_store,
        })
    }
}
