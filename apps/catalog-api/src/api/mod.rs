//! API routes module

pub mod health;
pub mod products;

use axum::Router;
use axum_helpers::health_router;

use crate::state::AppState;

/// Product routes plus `/health` and `/ready`
pub fn routes(state: &AppState) -> Router {
    Router::new()
        .merge(products::router(state))
        .merge(health::router(state.clone()))
        .merge(health_router(state.config.app))
}

pub async fn init_indexes(state: &AppState) -> eyre::Result<()> {
    products::init_indexes(state).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use database::mongodb::MongoConfig;
    use database::redis::RedisConfig;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    // Nothing listens on port 1; client construction is lazy, so only
    // requests that reach the store observe the failure.
    const UNREACHABLE: &str = "mongodb://127.0.0.1:1/catalog_test?serverSelectionTimeoutMS=200";

    async fn unreachable_state() -> AppState {
        let mongodb = MongoConfig::new(UNREACHABLE);
        let mongo_client = mongodb::Client::with_uri_str(UNREACHABLE).await.unwrap();
        let db = mongodb.select_database(&mongo_client);

        AppState {
            config: Config {
                app: app_info!(),
                mongodb,
                redis: RedisConfig::default(),
                server: ServerConfig::default(),
                environment: Environment::Development,
            },
            mongo_client,
            db,
            cache: None,
        }
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_app_info() {
        let app = routes(&unreachable_state().await);

        let (status, body) = get(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["name"], "catalog_api");
    }

    #[tokio::test]
    async fn test_ready_fails_without_database() {
        let app = routes(&unreachable_state().await);

        let (status, body) = get(app, "/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "not ready");
        assert_eq!(body["database"], "disconnected");
    }

    #[tokio::test]
    async fn test_malformed_id_is_rejected_before_the_store() {
        let app = routes(&unreachable_state().await);

        let (status, body) = get(app, "/products/not-an-id").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Invalid Product ID format");
    }

    #[tokio::test]
    async fn test_store_failure_is_a_generic_server_error() {
        let app = routes(&unreachable_state().await);

        let (status, body) = get(app, "/products").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, serde_json::json!({"message": "Server Error"}));
    }
}
