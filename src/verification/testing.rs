//! Test doubles for the verification controller.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::navigation::{Navigator, Route};
use crate::payments::traits::PaymentsApi;
use crate::payments::types::{
    DashboardSummary, DepositRequest, PaymentInitialization, PurchaseRequest, VerificationData,
    VerifyEndpoint, VerifyResponse,
};

#[derive(Debug, Clone, PartialEq)]
pub struct VerifyCall {
    pub endpoint: VerifyEndpoint,
    pub reference: String,
    pub token: Option<String>,
}

/// Answers verification calls from a fixed script
#[derive(Default)]
pub struct ScriptedApi {
    script: Mutex<VecDeque<ApiResult<VerifyResponse>>>,
    calls: Mutex<Vec<VerifyCall>>,
}

impl ScriptedApi {
    pub fn new(script: Vec<ApiResult<VerifyResponse>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<VerifyCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentsApi for ScriptedApi {
    async fn verify_payment(
        &self,
        endpoint: VerifyEndpoint,
        reference: &str,
        token: Option<&str>,
    ) -> ApiResult<VerifyResponse> {
        self.calls.lock().unwrap().push(VerifyCall {
            endpoint,
            reference: reference.to_string(),
            token: token.map(str::to_string),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::transport("script exhausted")))
    }

    async fn initialize_deposit(
        &self,
        _request: &DepositRequest,
        _token: &str,
    ) -> ApiResult<PaymentInitialization> {
        Err(ApiError::transport("not scripted"))
    }

    async fn initialize_purchase(
        &self,
        _request: &PurchaseRequest,
        _token: Option<&str>,
    ) -> ApiResult<PaymentInitialization> {
        Err(ApiError::transport("not scripted"))
    }

    async fn dashboard_summary(&self, _token: &str) -> ApiResult<DashboardSummary> {
        Err(ApiError::transport("not scripted"))
    }
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &Route) {
        self.routes.lock().unwrap().push(route.clone());
    }
}

pub fn confirmed(amount: f64, reference: &str, new_balance: Option<f64>) -> ApiResult<VerifyResponse> {
    Ok(VerifyResponse {
        success: true,
        message: Some("Payment verified".to_string()),
        data: Some(VerificationData {
            status: Some("success".to_string()),
            amount: Some(amount),
            reference: Some(reference.to_string()),
            new_balance,
            ..Default::default()
        }),
    })
}

pub fn declined(message: Option<&str>, status: Option<&str>) -> ApiResult<VerifyResponse> {
    Ok(VerifyResponse {
        success: false,
        message: message.map(str::to_string),
        data: Some(VerificationData {
            status: status.map(str::to_string),
            ..Default::default()
        }),
    })
}

pub fn network_error() -> ApiResult<VerifyResponse> {
    Err(ApiError::transport("connection reset by peer"))
}
