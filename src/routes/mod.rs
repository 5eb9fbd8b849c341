pub mod api;
pub mod ui;

use axum::{Router, response::Redirect, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // JSON
        .route("/api/rows/{kind}", get(api::handle_rows))
        .route(
            "/api/detail/{kind}/{namespace}/{name}",
            get(api::handle_detail),
        )
        .route("/api/namespaces", get(api::handle_namespaces))
        // Health
        .route("/healthz", get(api::handle_healthz))
        // Explorer UI
        .route("/ui/", get(ui::handle_explorer))
        .route("/ui/connect", get(ui::handle_connect))
        .route("/ui/refresh", get(ui::handle_refresh))
        // Static files
        .nest_service("/ui/static", ServeDir::new("static"))
        // Root redirect
        .route("/", get(|| async { Redirect::to("/ui/") }))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
