//! Axum router configuration with middleware.
//!
//! Conversation routes live under `/api/v1/`; `/health` sits at the root
//! for container probes. Middleware: CORS, tracing.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use bmo_types::config::Settings;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings);

    let api_routes = Router::new()
        .route("/conversation/wake", post(handlers::conversation::wake))
        .route("/conversation/respond", post(handlers::conversation::respond))
        .route("/transcription", post(handlers::transcription::transcribe));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// CORS policy from settings.
///
/// `app_url` is always allowed. A `"*"` entry allows every origin; the
/// request origin is mirrored back so credentials keep working.
pub fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins = allowed_origins(settings);

    let allow_origin = if origins.contains(&"*") {
        AllowOrigin::mirror_request()
    } else {
        let values = origins
            .iter()
            .filter_map(|&origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(origin, error = %e, "Ignoring invalid CORS origin");
                    None
                }
            });
        AllowOrigin::list(values)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Origins are compared without surrounding whitespace or trailing slashes.
fn normalize_origin(origin: &str) -> &str {
    origin.trim().trim_end_matches('/')
}

/// Configured origins plus `app_url`, normalized and without duplicates.
fn allowed_origins(settings: &Settings) -> Vec<&str> {
    let mut origins: Vec<&str> = Vec::with_capacity(settings.cors_origins.len() + 1);
    for origin in settings
        .cors_origins
        .iter()
        .chain(std::iter::once(&settings.app_url))
    {
        let origin = normalize_origin(origin);
        if !origin.is_empty() && !origins.contains(&origin) {
            origins.push(origin);
        }
    }
    origins
}
