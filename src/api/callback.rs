//! Gateway callback pages for wallet top-ups and storefront purchases
//!
//! The plain routes run verification to a terminal state and return the view;
//! the browser performs the redirect itself using `redirect.afterSecs`. A page
//! left on a retryable screen parks its controller, and the `/retry` routes
//! resume it. The `/events` routes stream every state change, the countdown
//! ticks and the final navigation over SSE.

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use tokio::sync::mpsc;
use tokio_stream::{wrappers::UnboundedReceiverStream, Stream, StreamExt};
use tracing::{debug, info, warn};

use super::retries::RetryRegistry;
use super::AppState;
use crate::navigation::{ChannelNavigator, DeferredNavigator};
use crate::storage::SessionStore;
use crate::verification::{
    CallbackParams, ControllerEvent, FlowConfig, VerificationController, VerificationView,
};

pub async fn wallet_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Json<VerificationView> {
    let flow = FlowConfig::wallet_deposit(&state.config.verification);
    Json(verify(&state, &headers, flow, &params).await)
}

pub async fn store_callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Json<VerificationView> {
    let flow = FlowConfig::store_purchase(&state.config.verification);
    Json(verify(&state, &headers, flow, &params).await)
}

pub async fn wallet_callback_retry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Json<VerificationView> {
    let flow = FlowConfig::wallet_deposit(&state.config.verification);
    Json(retry(&state, &headers, flow, &params).await)
}

pub async fn store_callback_retry(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Json<VerificationView> {
    let flow = FlowConfig::store_purchase(&state.config.verification);
    Json(retry(&state, &headers, flow, &params).await)
}

pub async fn wallet_callback_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let flow = FlowConfig::wallet_deposit(&state.config.verification);
    stream(&state, &headers, flow, params)
}

pub async fn store_callback_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<CallbackParams>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let flow = FlowConfig::store_purchase(&state.config.verification);
    stream(&state, &headers, flow, params)
}

async fn verify(
    state: &AppState,
    headers: &HeaderMap,
    flow: FlowConfig,
    params: &CallbackParams,
) -> VerificationView {
    let session = state.session(headers);
    let key = retry_key(flow.name, &session, params);
    let mut controller = VerificationController::new(
        state.api.clone(),
        session,
        Arc::new(DeferredNavigator),
        flow,
    );
    controller.start(params).await;
    settle(state, key, controller).await
}

/// Resume the controller parked by the failed page, or verify afresh when
/// none is parked
async fn retry(
    state: &AppState,
    headers: &HeaderMap,
    flow: FlowConfig,
    params: &CallbackParams,
) -> VerificationView {
    let session = state.session(headers);
    let key = retry_key(flow.name, &session, params);

    let parked = match &key {
        Some(key) => state.retries.take(key).await,
        None => None,
    };
    let Some(mut controller) = parked else {
        info!(flow = flow.name, "No parked verification to resume, starting over");
        return verify(state, headers, flow, params).await;
    };

    controller.retry().await;
    settle(state, key, controller).await
}

async fn settle(
    state: &AppState,
    key: Option<String>,
    controller: VerificationController,
) -> VerificationView {
    let view = controller.view();
    if let Some(key) = key.filter(|_| controller.can_retry()) {
        state.retries.park(key, controller).await;
    }
    view
}

fn retry_key(flow: &str, session: &SessionStore, params: &CallbackParams) -> Option<String> {
    if session.is_anonymous() {
        return None;
    }
    params
        .payment_reference()
        .map(|reference| RetryRegistry::key(flow, session.session_id(), reference))
}

fn stream(
    state: &AppState,
    headers: &HeaderMap,
    flow: FlowConfig,
    params: CallbackParams,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut controller = VerificationController::new(
        state.api.clone(),
        state.session(headers),
        Arc::new(ChannelNavigator::new(tx.clone())),
        flow,
    )
    .with_events(tx.clone());

    tokio::spawn(async move {
        controller.start(&params).await;

        let Some(mut countdown) = controller.start_countdown() else {
            return;
        };
        tokio::select! {
            _ = countdown.finished() => {}
            _ = tx.closed() => {
                debug!("Callback stream closed, cancelling redirect countdown");
            }
        }
    });

    let events = UnboundedReceiverStream::new(rx).filter_map(|event| to_sse(&event));
    Sse::new(events).keep_alive(KeepAlive::default())
}

fn to_sse(event: &ControllerEvent) -> Option<Result<Event, Infallible>> {
    match Event::default().event(event.name()).json_data(event) {
        Ok(sse) => Some(Ok(sse)),
        Err(e) => {
            warn!("Dropping unserialisable {} event: {}", event.name(), e);
            None
        }
    }
}
