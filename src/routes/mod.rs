pub mod api_keys;
pub mod sessions;
pub mod stations;
pub mod users;
pub mod weather_data;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::common::AppState;
use crate::validate::{validate_name, validate_uuid};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Captured `{id}` segments accept a UUID or a display name; anything else
/// behaves like an unmatched path.
pub(crate) fn valid_ref(s: &str) -> bool {
    validate_uuid(s) || validate_name(s)
}

// ============================================================================
// Router Builder
// ============================================================================

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/users", post(users::create).get(users::list_all))
        .route(
            "/users/{id}",
            get(users::list_one)
                .patch(users::patch)
                .delete(users::delete),
        )
        .route(
            "/users/{id}/sessions",
            post(sessions::create).get(sessions::list),
        )
        .route(
            "/users/{id}/sessions/{session_id}",
            get(sessions::list_one).delete(sessions::delete),
        )
        .route(
            "/users/{id}/api-keys",
            post(api_keys::create).get(api_keys::list),
        )
        .route(
            "/users/{id}/api-keys/{key_id}",
            get(api_keys::list_one).delete(api_keys::delete),
        )
        .route("/stations", post(stations::create).get(stations::list))
        .route("/stations/{station}", get(stations::list_one))
        .route(
            "/stations/{station}/weather-data",
            get(weather_data::list),
        )
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        // Cross-origin reads only; mutating methods stay same-origin.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
