//! Redis cache connection

mod config;
mod connector;

pub use config::{DEFAULT_REDIS_URL, RedisConfig};
pub use connector::{connect, connect_from_config, connect_with_retry};

pub use redis::aio::ConnectionManager;
pub use redis::{AsyncCommands, Client, RedisResult};
