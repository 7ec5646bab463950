pub mod docs;
pub mod error;
pub mod routes;
pub mod state;

use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use crate::adapters::http::state::HttpState;

pub fn router(state: HttpState, body_limit_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(routes::upload))
        .route("/predict", post(routes::predict))
        .route("/health", get(routes::health))
        .route("/", get(routes::root))
        .layer(DefaultBodyLimit::max(body_limit_bytes))
        .with_state(state)
        .merge(docs::swagger_ui())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
