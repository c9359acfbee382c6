use axum::{Router, routing::get};
use tower_http::cors::CorsLayer;

use crate::AppState;

mod charts;
mod reports;
mod todos;

pub fn router(state: AppState) -> Router {
    Router::<AppState>::new()
        .route("/health", get(health))
        .merge(todos::router())
        .merge(charts::router())
        .merge(reports::router())
        .merge(crate::ws::router())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
