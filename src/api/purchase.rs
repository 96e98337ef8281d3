use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use tracing::{info, warn};

use super::deposit::CheckoutResponse;
use super::AppState;
use crate::error::AppError;
use crate::format::CURRENCY_CODE;
use crate::payments::types::{PendingPurchase, PurchaseRequest};
use crate::validation::{is_valid_subdomain, normalize_phone, validate_amount};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseForm {
    pub network: String,
    pub capacity: String,
    pub phone_number: String,
    pub amount: f64,
    #[serde(default)]
    pub email: Option<String>,
}

/// Start a storefront bundle purchase
///
/// The pending-purchase snapshot is written before the gateway URL is handed
/// back, so the callback page can show the order even if the backend's
/// verification payload is sparse.
pub async fn initialize_purchase(
    State(state): State<AppState>,
    Path(subdomain): Path<String>,
    headers: HeaderMap,
    Json(form): Json<PurchaseForm>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let subdomain = subdomain.trim().to_lowercase();
    if !is_valid_subdomain(&subdomain) {
        return Err(AppError::bad_request("Store not found"));
    }

    let network = form.network.trim().to_string();
    let capacity = form.capacity.trim().to_string();
    if network.is_empty() || capacity.is_empty() {
        return Err(AppError::bad_request("Select a network and bundle"));
    }

    let phone_number = normalize_phone(&form.phone_number)
        .ok_or_else(|| AppError::bad_request("Enter a valid Ghana phone number"))?;
    let amount = validate_amount(form.amount).map_err(AppError::bad_request)?;

    let session = state.session(&headers);
    let token = match session.token().await {
        Ok(token) => token,
        Err(e) => {
            warn!("Could not read session token, continuing as guest: {}", e);
            None
        }
    };

    let request = PurchaseRequest {
        subdomain: subdomain.clone(),
        network: network.clone(),
        capacity: capacity.clone(),
        phone_number: phone_number.clone(),
        amount,
        email: form.email.filter(|e| !e.trim().is_empty()),
    };
    session.set_purchase_data(&request).await?;

    let init = state
        .api
        .initialize_purchase(&request, token.as_deref())
        .await?;

    session
        .set_pending_purchase(&PendingPurchase {
            amount,
            phone_number,
            subdomain: subdomain.clone(),
            network: Some(network),
            capacity: Some(capacity),
            reference: Some(init.reference.clone()),
        })
        .await?;

    info!(
        target: "analytics",
        event = "begin_checkout",
        flow = "store_purchase",
        subdomain = %subdomain,
        reference = %init.reference,
        amount,
        currency = CURRENCY_CODE,
    );

    Ok(Json(CheckoutResponse {
        authorization_url: init.authorization_url,
        reference: init.reference,
    }))
}
