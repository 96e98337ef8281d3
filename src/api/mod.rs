//! HTTP page hosts
//!
//! Each customer page is served as a JSON view model; the payment callback
//! pages also stream their state over SSE.

pub mod callback;
pub mod dashboard;
pub mod deposit;
pub mod footer;
pub mod health;
pub mod purchase;
pub mod retries;
pub mod session;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use http::{HeaderMap, HeaderName};
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::payments::PaymentsApi;
use crate::storage::{KeyValueStore, SessionStore};
use retries::RetryRegistry;

pub const SESSION_HEADER: &str = "x-session-id";
const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub api: Arc<dyn PaymentsApi>,
    pub store: Arc<dyn KeyValueStore>,
    pub retries: Arc<RetryRegistry>,
}

impl AppState {
    pub fn new(config: Config, api: Arc<dyn PaymentsApi>, store: Arc<dyn KeyValueStore>) -> Self {
        let retries = Arc::new(RetryRegistry::new(config.session.ttl));
        Self {
            config: Arc::new(config),
            api,
            store,
            retries,
        }
    }

    /// Session named by the request's `x-session-id` header, or an empty
    /// throwaway session when the header is missing
    pub fn session(&self, headers: &HeaderMap) -> SessionStore {
        headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| SessionStore::new(self.store.clone(), id))
            .unwrap_or_else(SessionStore::anonymous)
    }
}

pub fn router(state: AppState) -> Router {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/session", post(session::create_session))
        .route("/dashboard", get(dashboard::dashboard))
        .route("/footer", get(footer::footer))
        .route("/wallet/deposit", post(deposit::initialize_deposit))
        .route("/wallet/deposit/callback", get(callback::wallet_callback))
        .route(
            "/wallet/deposit/callback/events",
            get(callback::wallet_callback_events),
        )
        .route(
            "/wallet/deposit/callback/retry",
            post(callback::wallet_callback_retry),
        )
        .route("/store/callback", get(callback::store_callback))
        .route("/store/callback/retry", post(callback::store_callback_retry))
        .route(
            "/store/callback/events",
            get(callback::store_callback_events),
        )
        .route("/store/:subdomain/purchase", post(purchase::initialize_purchase))
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .with_state(state)
}
