//! Backend API trait definitions
//!
//! The page hosts and the verification controller only see this trait, so
//! tests can swap the HTTP client for a scripted double.

use crate::error::ApiResult;
use crate::payments::types::{
    DashboardSummary, DepositRequest, PaymentInitialization, PurchaseRequest, VerifyEndpoint,
    VerifyResponse,
};
use async_trait::async_trait;

/// Operations the customer pages need from the platform backend
#[async_trait]
pub trait PaymentsApi: Send + Sync {
    /// Confirm a payment reference after the gateway redirect
    ///
    /// Returns the backend's envelope as-is, including authoritative
    /// `success: false` answers. Only transport problems and rejected
    /// credentials surface as errors. Implementations must not retry; the
    /// caller owns retry policy.
    async fn verify_payment(
        &self,
        endpoint: VerifyEndpoint,
        reference: &str,
        token: Option<&str>,
    ) -> ApiResult<VerifyResponse>;

    /// Start a wallet top-up and get the hosted payment page URL
    async fn initialize_deposit(
        &self,
        request: &DepositRequest,
        token: &str,
    ) -> ApiResult<PaymentInitialization>;

    /// Start a storefront bundle purchase
    async fn initialize_purchase(
        &self,
        request: &PurchaseRequest,
        token: Option<&str>,
    ) -> ApiResult<PaymentInitialization>;

    /// Wallet balance and today's orders
    async fn dashboard_summary(&self, token: &str) -> ApiResult<DashboardSummary>;
}
