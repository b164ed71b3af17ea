//! Admin login endpoint — checks credentials against the server config.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::warn;

use roadwatch_core::{Empty, Envelope, ServiceError};

use crate::bootstrap::verify_admin_credentials;
use crate::routes::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Register login routes.
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/admin/login", post(login_handler))
        .with_state(state)
}

/// Handle POST /admin/login.
///
/// There is no token to hand out — success just tells the dashboard
/// to show the admin controls. Failure rides HTTP 200 like every
/// other error envelope.
async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Envelope<Empty>>, ServiceError> {
    if !verify_admin_credentials(&body.username, &body.password, &state.server_config.admin) {
        warn!(username = %body.username, "failed admin login");
        return Err(ServiceError::Unauthorized(
            "invalid username or password".into(),
        ));
    }
    Ok(Json(Envelope::ok("Login successful")))
}
