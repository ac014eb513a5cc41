//! Configuration for the Catalog API

use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use database::mongodb::MongoConfig;
use database::redis::RedisConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub redis: RedisConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?.with_app_name(env!("CARGO_PKG_NAME"));
        let redis = RedisConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            redis,
            server,
            environment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_env() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("MONGODB_URL", Some("mongodb://mongo:27017/shop")),
                ("MONGODB_DATABASE", None::<&str>),
                ("MONGO_DATABASE", None::<&str>),
                ("REDIS_URL", Some("redis://cache:6379")),
                ("PORT", Some("8080")),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Production);
                assert_eq!(config.mongodb.url, "mongodb://mongo:27017/shop");
                assert_eq!(config.mongodb.app_name.as_deref(), Some("catalog_api"));
                assert_eq!(config.redis.url, "redis://cache:6379");
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.app.name, "catalog_api");
            },
        );
    }

    #[test]
    fn test_config_requires_mongo_url() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", None::<&str>),
                ("MONGO_URL", None::<&str>),
                ("MONGOURL", None::<&str>),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_config_rejects_bad_port() {
        temp_env::with_vars(
            [
                ("MONGODB_URL", Some("mongodb://localhost:27017")),
                ("PORT", Some("not-a-port")),
            ],
            || {
                let err = Config::from_env().unwrap_err();
                assert!(err.to_string().contains("PORT"));
            },
        );
    }
}
