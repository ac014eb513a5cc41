use axum::http::{HeaderName, HeaderValue, Method, header};
use std::io;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

/// Creates the CORS layer used by the API.
///
/// - Methods: GET, POST, PUT, DELETE, OPTIONS
/// - Headers: Origin, X-Requested-With, Content-Type, Accept, Authorization
/// - Credentials allowed, 1 hour max age
pub fn create_cors_layer(allow_origin: AllowOrigin) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(3600))
}

/// Split a comma-separated origin list, skipping blanks.
pub fn parse_allowed_origins(raw: &str) -> io::Result<Vec<HeaderValue>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<HeaderValue>().map_err(|e| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Invalid CORS_ALLOWED_ORIGIN value '{s}': {e}"),
                )
            })
        })
        .collect()
}

/// Build the CORS layer from `CORS_ALLOWED_ORIGIN`.
///
/// When the variable is unset or blank every request origin is mirrored back,
/// so credentialed browser requests work from any site.
pub fn cors_layer_from_env() -> io::Result<CorsLayer> {
    let origins = match std::env::var("CORS_ALLOWED_ORIGIN") {
        Ok(raw) => parse_allowed_origins(&raw)?,
        Err(_) => Vec::new(),
    };

    let allow_origin = if origins.is_empty() {
        info!("CORS_ALLOWED_ORIGIN not set, mirroring request origins");
        AllowOrigin::mirror_request()
    } else {
        info!(origins = origins.len(), "CORS configured with allow-list");
        AllowOrigin::list(origins)
    };

    Ok(create_cors_layer(allow_origin))
}
