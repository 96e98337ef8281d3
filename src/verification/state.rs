use std::fmt;

use serde::Serialize;

use super::error::VerificationError;
use crate::payments::types::{PendingPurchase, VerificationData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Verifying,
    Success,
    Failed,
    Error,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Verifying => "verifying",
            Phase::Success => "success",
            Phase::Failed => "failed",
            Phase::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerificationState {
    Verifying,
    Success(VerifiedPayment),
    /// Authoritative rejection from the backend
    Failed(VerificationError),
    /// Input, auth or transport failure
    Error(VerificationError),
}

impl VerificationState {
    pub fn phase(&self) -> Phase {
        match self {
            VerificationState::Verifying => Phase::Verifying,
            VerificationState::Success(_) => Phase::Success,
            VerificationState::Failed(_) => Phase::Failed,
            VerificationState::Error(_) => Phase::Error,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, VerificationState::Verifying)
    }

    pub fn error(&self) -> Option<&VerificationError> {
        match self {
            VerificationState::Failed(err) | VerificationState::Error(err) => Some(err),
            _ => None,
        }
    }
}

/// A confirmed payment, as shown on the success screen
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedPayment {
    pub reference: String,
    pub amount: Option<f64>,
    pub new_balance: Option<f64>,
    pub paid_at: Option<String>,
    pub network: Option<String>,
    pub capacity: Option<String>,
    pub phone_number: Option<String>,
    /// Accepted through the first-attempt `completed` status override
    pub reconciled: bool,
}

impl VerifiedPayment {
    /// Server data wins; the cached snapshot fills what the server left out
    pub fn merge(
        reference: &str,
        data: VerificationData,
        pending: Option<&PendingPurchase>,
        reconciled: bool,
    ) -> Self {
        let reference = data
            .reference
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| reference.to_string());

        Self {
            reference,
            amount: data.amount.or(pending.map(|p| p.amount)),
            new_balance: data.new_balance,
            paid_at: data.paid_at,
            network: data.network.or_else(|| pending.and_then(|p| p.network.clone())),
            capacity: data
                .capacity
                .or_else(|| pending.and_then(|p| p.capacity.clone())),
            phone_number: data
                .phone_number
                .or_else(|| pending.map(|p| p.phone_number.clone())),
            reconciled,
        }
    }
}
