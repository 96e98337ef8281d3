use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::AppState;
use crate::error::AppError;
use crate::storage::SessionStore;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Exchange a login token for a session id
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), AppError> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(AppError::bad_request("Token is required"));
    }

    let session_id = Uuid::new_v4().to_string();
    SessionStore::new(state.store.clone(), session_id.as_str())
        .set_token(token)
        .await?;

    info!(session_id = %session_id, "Session created");
    Ok((StatusCode::CREATED, Json(CreateSessionResponse { session_id })))
}
