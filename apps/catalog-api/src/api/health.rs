//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::mongodb::check_health_detailed;

use crate::state::AppState;

/// `200` once MongoDB answers a ping, `503` otherwise.
///
/// The cache is optional and does not gate readiness.
async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let database: HealthCheckFuture = Box::pin(async {
        let status = check_health_detailed(&state.db).await;
        if status.healthy {
            Ok(())
        } else {
            Err(status.message.unwrap_or_else(|| "ping failed".to_string()))
        }
    });

    run_health_checks(vec![("database", database)]).await
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}
