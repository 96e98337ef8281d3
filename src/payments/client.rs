//! Platform backend HTTP client
//!
//! Talks to the bundle platform's REST API: payment verification, deposit and
//! purchase initialization, and the dashboard aggregate.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};
use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::payments::traits::PaymentsApi;
use crate::payments::types::{
    ApiEnvelope, DashboardSummary, DepositRequest, PaymentInitialization, PurchaseRequest,
    VerifyEndpoint, VerifyResponse,
};

/// Backend client configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Backend base URL, e.g. `https://api.example.com`
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Retries for idempotent reads other than verification
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:4000".to_string(),
            timeout_secs: 15,
            max_retries: 2,
        }
    }
}

pub struct BackendClient {
    config: BackendConfig,
    base_url: Url,
    client: Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> ApiResult<Self> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ApiError::transport(format!("Invalid backend URL: {}", e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::transport(format!(
                "Backend URL cannot be used as a base: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("bundlepay-web/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Build an endpoint URL; each segment is percent-encoded on its own
    pub fn endpoint_url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::transport("Backend URL cannot be used as a base"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, url);
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> ApiResult<(StatusCode, String)> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout {
                    seconds: self.config.timeout_secs,
                }
            } else {
                ApiError::from(e)
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(ApiError::from)?;
        Ok((status, body))
    }

    /// Send a request and decode the envelope, retrying transient failures
    /// with exponential backoff
    async fn fetch_envelope<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        token: Option<&str>,
        body: Option<&serde_json::Value>,
        max_retries: u32,
    ) -> ApiResult<ApiEnvelope<T>> {
        let mut attempt = 0;
        loop {
            let mut request = self.request(method.clone(), url.clone(), token);
            if let Some(body) = body {
                request = request.json(body);
            }

            let result = match self.send(request).await {
                Ok((status, body)) => decode_envelope(status, &body),
                Err(e) => Err(e),
            };

            match result {
                Err(e) if e.is_transient() && attempt < max_retries => {
                    let backoff = 2_u64.pow(attempt);
                    warn!(
                        "Backend request to {} failed, retrying after {} seconds (attempt {}): {}",
                        url.path(),
                        backoff,
                        attempt + 1,
                        e
                    );
                    tokio::time::sleep(Duration::from_secs(backoff)).await;
                    attempt += 1;
                }
                Err(e) => {
                    error!("Backend request to {} failed: {}", url.path(), e);
                    return Err(e);
                }
                Ok(envelope) => return Ok(envelope),
            }
        }
    }

    async fn initialize(
        &self,
        segments: &[&str],
        payload: serde_json::Value,
        token: Option<&str>,
    ) -> ApiResult<PaymentInitialization> {
        let url = self.endpoint_url(segments)?;
        let envelope: ApiEnvelope<PaymentInitialization> = self
            .fetch_envelope(Method::POST, url, token, Some(&payload), 0)
            .await?;
        require_data(envelope, "Payment could not be initialized")
    }
}

/// Map an HTTP answer onto the envelope, classifying statuses the page layer
/// cannot treat as an authoritative answer
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, body: &str) -> ApiResult<ApiEnvelope<T>> {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(ApiError::Unauthorized);
    }
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        return Err(ApiError::Server {
            status: status.as_u16(),
        });
    }

    serde_json::from_str::<ApiEnvelope<T>>(body).map_err(|e| {
        ApiError::invalid_response(format!("HTTP {} with unreadable body: {}", status, e))
    })
}

fn require_data<T>(envelope: ApiEnvelope<T>, fallback: &str) -> ApiResult<T> {
    if !envelope.success {
        return Err(ApiError::rejected(
            envelope.message.unwrap_or_else(|| fallback.to_string()),
        ));
    }
    envelope
        .data
        .ok_or_else(|| ApiError::invalid_response("Response is missing data"))
}

#[async_trait]
impl PaymentsApi for BackendClient {
    async fn verify_payment(
        &self,
        endpoint: VerifyEndpoint,
        reference: &str,
        token: Option<&str>,
    ) -> ApiResult<VerifyResponse> {
        info!("Verifying payment: reference={}", reference);

        let mut segments: Vec<&str> = endpoint.segments().to_vec();
        segments.push(reference);
        let url = self.endpoint_url(&segments)?;

        let response: VerifyResponse = self.fetch_envelope(Method::GET, url, token, None, 0).await?;

        info!(
            "Payment verification answered: reference={}, success={}",
            reference, response.success
        );
        Ok(response)
    }

    async fn initialize_deposit(
        &self,
        request: &DepositRequest,
        token: &str,
    ) -> ApiResult<PaymentInitialization> {
        info!("Initializing wallet deposit: amount={}", request.amount);

        let payload = serde_json::to_value(request)?;
        let init = self
            .initialize(&["api", "payments", "initialize"], payload, Some(token))
            .await?;

        info!("Wallet deposit initialized: reference={}", init.reference);
        Ok(init)
    }

    async fn initialize_purchase(
        &self,
        request: &PurchaseRequest,
        token: Option<&str>,
    ) -> ApiResult<PaymentInitialization> {
        info!(
            "Initializing bundle purchase: subdomain={}, network={}, capacity={}",
            request.subdomain, request.network, request.capacity
        );

        let payload = serde_json::to_value(request)?;
        let init = self
            .initialize(&["api", "purchase", "initialize"], payload, token)
            .await?;

        info!("Bundle purchase initialized: reference={}", init.reference);
        Ok(init)
    }

    async fn dashboard_summary(&self, token: &str) -> ApiResult<DashboardSummary> {
        let url = self.endpoint_url(&["api", "dashboard"])?;
        let envelope: ApiEnvelope<DashboardSummary> = self
            .fetch_envelope(Method::GET, url, Some(token), None, self.config.max_retries)
            .await?;
        require_data(envelope, "Dashboard is unavailable")
    }
}
