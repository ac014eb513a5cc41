use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use super::RedisConfig;
use crate::common::{
    DatabaseResult, RetryConfig, redact_credentials, retry, retry_with_backoff,
};

/// Open a [`ConnectionManager`] and verify it with `PING`.
///
/// The manager reconnects on its own after the initial handshake.
pub async fn connect(url: &str) -> DatabaseResult<ConnectionManager> {
    info!(url = %redact_credentials(url), "Connecting to Redis");

    let client = Client::open(url)?;
    let mut manager = ConnectionManager::new(client).await?;
    let _: String = redis::cmd("PING").query_async(&mut manager).await?;

    info!("Connected to Redis");
    Ok(manager)
}

pub async fn connect_from_config(config: &RedisConfig) -> DatabaseResult<ConnectionManager> {
    connect(&config.url).await
}

/// [`connect`] with exponential backoff; `None` uses [`RetryConfig::default`].
pub async fn connect_with_retry(
    url: &str,
    retry_config: Option<RetryConfig>,
) -> DatabaseResult<ConnectionManager> {
    match retry_config {
        Some(config) => retry_with_backoff(|| connect(url), config).await,
        None => retry(|| connect(url)).await,
    }
}
