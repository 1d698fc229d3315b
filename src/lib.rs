use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod state;

use config::SecurityConfig;
use state::AppState;

/// Build the board's router with CORS and request tracing applied
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(message_routes())
        .route("/health", get(handlers::health::health))
        .with_state(state)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn message_routes() -> Router<AppState> {
    use handlers::messages;

    Router::new()
        .route("/", get(messages::list).post(messages::create))
        .route("/update/:id", post(messages::update))
        .route("/delete/:id", post(messages::delete))
}

/// Only GET/POST with a `Content-Type` header, from the configured origins
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}
