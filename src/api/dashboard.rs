use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;
use tracing::{debug, warn};

use super::AppState;
use crate::error::{ApiError, AppError};
use crate::format::format_cedis;
use crate::payments::types::{DashboardSummary, OrderSummary};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub wallet_balance: String,
    pub wallet_balance_value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders_today: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_spent_today: Option<String>,
    pub recent_orders: Vec<OrderView>,
    /// Balance came from the session cache because the backend was unreachable
    pub stale: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: String,
    pub network: Option<String>,
    pub capacity: Option<String>,
    pub phone_number: Option<String>,
    pub amount: String,
    pub status: String,
    pub created_at: Option<String>,
}

impl From<OrderSummary> for OrderView {
    fn from(order: OrderSummary) -> Self {
        Self {
            id: order.id,
            network: order.network,
            capacity: order.capacity,
            phone_number: order.phone_number,
            amount: format_cedis(order.amount),
            status: order.status,
            created_at: order.created_at,
        }
    }
}

impl DashboardView {
    fn live(summary: DashboardSummary) -> Self {
        Self {
            wallet_balance: format_cedis(summary.wallet_balance),
            wallet_balance_value: summary.wallet_balance,
            orders_today: Some(summary.orders_today),
            amount_spent_today: Some(format_cedis(summary.amount_spent_today)),
            recent_orders: summary.recent_orders.into_iter().map(OrderView::from).collect(),
            stale: false,
        }
    }

    fn cached(balance: f64) -> Self {
        Self {
            wallet_balance: format_cedis(balance),
            wallet_balance_value: balance,
            orders_today: None,
            amount_spent_today: None,
            recent_orders: Vec::new(),
            stale: true,
        }
    }
}

pub async fn dashboard(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<DashboardView>, AppError> {
    let session = state.session(&headers);
    let token = session.token().await?.ok_or(AppError::Unauthenticated)?;

    match state.api.dashboard_summary(&token).await {
        Ok(summary) => {
            if let Err(e) = session.set_cached_balance(summary.wallet_balance).await {
                warn!("Could not cache wallet balance: {}", e);
            }
            Ok(Json(DashboardView::live(summary)))
        }
        Err(ApiError::Unauthorized) => Err(AppError::Backend(ApiError::Unauthorized)),
        Err(e) => match session.cached_balance().await? {
            Some(balance) => {
                warn!("Dashboard backend unavailable, serving cached balance: {}", e);
                Ok(Json(DashboardView::cached(balance)))
            }
            None => {
                debug!("No cached balance to fall back on");
                Err(AppError::Backend(e))
            }
        },
    }
}
