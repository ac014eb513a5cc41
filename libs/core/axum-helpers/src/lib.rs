//! # Axum Helpers
//!
//! Shared HTTP plumbing for the catalog services.
//!
//! - **[`server`]**: router assembly with OpenAPI UIs, health endpoints,
//!   graceful shutdown and cleanup
//! - **[`http`]**: CORS and security header middleware
//! - **[`errors`]**: [`AppError`] and the `{"message", "errors"?}` error body
//! - **[`extractors`]**: [`JsonBody`], a JSON extractor that rejects with [`AppError`]
//!
//! ```ignore
//! use axum_helpers::{create_production_app, create_router, health_router};
//!
//! let app = create_router::<ApiDoc>(api_routes.merge(health_router(app_info!())))?;
//! create_production_app(app, &config, Duration::from_secs(30), async {}).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    CleanupCoordinator, HealthCheckFuture, HealthResponse, ShutdownCoordinator,
    create_production_app, create_router, health_router, run_health_checks,
};

pub use http::{cors_layer_from_env, create_cors_layer, security_headers};

pub use errors::{AppError, ErrorResponse};

pub use extractors::JsonBody;
