//! Route registration — collects module routes + system endpoints.

use std::sync::Arc;

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::login;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub server_config: Arc<ServerConfig>,
}

/// Build the complete router with all routes.
///
/// Module routers carry their own state and are merged at the root —
/// their paths are the fixed dashboard contract. The permissive CORS
/// layer lets the dashboard call in from wherever it is hosted.
pub fn build_router(state: AppState, module_routes: Vec<(&str, Router)>) -> Router {
    let mut app: Router = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .merge(login::routes(state));

    for (name, router) in module_routes {
        info!("Mounted {name} module routes");
        app = app.merge(router);
    }

    app.layer(CorsLayer::permissive())
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "roadwatchd",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
