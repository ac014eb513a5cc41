use mongodb::{Client, Database};

use crate::common::redact_credentials;

#[cfg(feature = "config")]
use core_config::{ConfigError, FromEnv, env_first, env_parse_or};

/// Database used when neither the config nor the connection string names one.
pub const DEFAULT_DATABASE: &str = "catalog";

/// MongoDB connection settings
///
/// ```ignore
/// use database::mongodb::MongoConfig;
///
/// let config = MongoConfig::new("mongodb://localhost:27017/shop");
/// let config = MongoConfig::with_database("mongodb://localhost:27017", "catalog");
/// let config = MongoConfig::from_env()?; // `config` feature
/// ```
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// Connection string, `mongodb://[user:pass@]host[:port][/database][?options]`
    pub url: String,

    /// Explicit database name. When `None` the database from the URL path is
    /// used, then [`DEFAULT_DATABASE`].
    pub database: Option<String>,

    /// Application name reported to the server
    pub app_name: Option<String>,

    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_database(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: Some(database.into()),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    pub fn with_pool_size(mut self, max_pool_size: u32, min_pool_size: u32) -> Self {
        self.max_pool_size = max_pool_size;
        self.min_pool_size = min_pool_size;
        self
    }

    /// Resolve the database handle: explicit name, then the URL's default
    /// database, then [`DEFAULT_DATABASE`].
    pub fn select_database(&self, client: &Client) -> Database {
        match &self.database {
            Some(name) => client.database(name),
            None => client
                .default_database()
                .unwrap_or_else(|| client.database(DEFAULT_DATABASE)),
        }
    }

    /// The connection string with any password replaced, safe for logs.
    pub fn redacted_url(&self) -> String {
        redact_credentials(&self.url)
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: None,
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
        }
    }
}

/// Environment variables:
/// - `MONGODB_URL`, `MONGO_URL` or `MONGOURL` (required)
/// - `MONGODB_DATABASE` or `MONGO_DATABASE` (optional)
/// - `MONGODB_APP_NAME` (optional)
/// - `MONGODB_MAX_POOL_SIZE` (default 100), `MONGODB_MIN_POOL_SIZE` (default 5)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (default 10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (default 30)
#[cfg(feature = "config")]
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let url = env_first(&["MONGODB_URL", "MONGO_URL", "MONGOURL"]).ok_or_else(|| {
            ConfigError::MissingEnvVar("MONGODB_URL, MONGO_URL or MONGOURL".to_string())
        })?;

        Ok(Self {
            url,
            database: env_first(&["MONGODB_DATABASE", "MONGO_DATABASE"]),
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse_or("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse_or("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout_secs: env_parse_or(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse_or(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            )?,
        })
    }
}
