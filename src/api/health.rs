use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::AppState;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub backend_configured: bool,
    pub session_backend: String,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let config = &state.config;

    let session_backend = if cfg!(feature = "cache") && config.session.redis_url.is_some() {
        "redis"
    } else {
        "memory"
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: config.server.environment.clone(),
        backend_configured: !config.backend.base_url.trim().is_empty(),
        session_backend: session_backend.to_string(),
    })
}
