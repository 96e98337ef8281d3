//! Backend API payloads
//!
//! The backend answers every call with the same `{ success, message, data }`
//! envelope. Field shapes vary by call site, so amounts and capacities are
//! read leniently (numbers or numeric strings).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which verification endpoint a callback page polls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyEndpoint {
    /// Wallet top-up: `GET /api/payments/verify/{reference}`
    Deposit,
    /// Storefront bundle purchase: `GET /api/purchase/verify/{reference}`
    Purchase,
}

impl VerifyEndpoint {
    pub fn segments(&self) -> [&'static str; 3] {
        match self {
            VerifyEndpoint::Deposit => ["api", "payments", "verify"],
            VerifyEndpoint::Purchase => ["api", "purchase", "verify"],
        }
    }
}

/// Standard backend response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub type VerifyResponse = ApiEnvelope<VerificationData>;

/// Payload of a verification call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationData {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub new_balance: Option<f64>,
    #[serde(default)]
    pub paid_at: Option<String>,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub capacity: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
}

/// Purchase details cached before the browser leaves for the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingPurchase {
    pub amount: f64,
    pub phone_number: String,
    pub subdomain: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub capacity: Option<String>,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub subdomain: String,
    pub network: String,
    pub capacity: String,
    pub phone_number: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Where to send the browser to pay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitialization {
    pub authorization_url: String,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[serde(default, deserialize_with = "lenient_amount_or_zero")]
    pub wallet_balance: f64,
    #[serde(default)]
    pub orders_today: u32,
    #[serde(default, deserialize_with = "lenient_amount_or_zero")]
    pub amount_spent_today: f64,
    #[serde(default)]
    pub recent_orders: Vec<OrderSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: String,
    #[serde(default)]
    pub network: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub capacity: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount_or_zero")]
    pub amount: f64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|amount| amount.is_finite()))
}

fn lenient_amount_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_amount(deserializer)?.unwrap_or_default())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
