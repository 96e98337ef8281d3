use axum::{extract::State, http::HeaderMap, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::error::AppError;
use crate::format::CURRENCY_CODE;
use crate::payments::types::DepositRequest;
use crate::validation::validate_amount;

#[derive(Debug, Deserialize)]
pub struct DepositForm {
    pub amount: f64,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub authorization_url: String,
    pub reference: String,
}

/// Start a wallet top-up; the browser follows `authorizationUrl`
pub async fn initialize_deposit(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(form): Json<DepositForm>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let amount = validate_amount(form.amount).map_err(AppError::bad_request)?;

    let session = state.session(&headers);
    let token = session.token().await?.ok_or(AppError::Unauthenticated)?;

    let request = DepositRequest {
        amount,
        email: form.email.filter(|e| !e.trim().is_empty()),
    };
    let init = state.api.initialize_deposit(&request, &token).await?;

    info!(
        target: "analytics",
        event = "begin_checkout",
        flow = "wallet_deposit",
        reference = %init.reference,
        amount,
        currency = CURRENCY_CODE,
    );

    Ok(Json(CheckoutResponse {
        authorization_url: init.authorization_url,
        reference: init.reference,
    }))
}
