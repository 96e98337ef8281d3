//! The payment verification controller
//!
//! One controller drives one callback page: it reads the reference from the
//! gateway redirect, polls the backend (with a single delayed retry on
//! transport failure), applies the success side effects to the session and
//! hands out the redirect countdown.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, error, info, warn};

use super::countdown::Countdown;
use super::error::{VerificationError, VerificationErrorKind};
use super::machine::{next_step, Step};
use super::redirect::{FixedRedirect, RedirectContext, RedirectResolver, StoreRedirect};
use super::state::{VerificationState, VerifiedPayment};
use super::view::{ControllerEvent, EventSender, RecoveryAction, RedirectView, VerificationView};
use crate::config::VerificationConfig;
use crate::format::{format_cedis, CURRENCY_CODE};
use crate::navigation::{whatsapp_support_link, Navigator, Route};
use crate::payments::traits::PaymentsApi;
use crate::payments::types::{PendingPurchase, VerificationData, VerifyEndpoint};
use crate::storage::SessionStore;

/// Query parameters the gateway appends to the callback URL
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub trxref: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl CallbackParams {
    pub fn with_reference(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }

    /// `reference` if present, otherwise the gateway's `trxref`
    pub fn payment_reference(&self) -> Option<&str> {
        non_blank(self.reference.as_deref()).or_else(|| non_blank(self.trxref.as_deref()))
    }

    pub fn subdomain_hint(&self) -> Option<&str> {
        non_blank(self.subdomain.as_deref())
    }
}

/// Per-page parameters of the verification flow
#[derive(Clone)]
pub struct FlowConfig {
    pub name: &'static str,
    pub endpoint: VerifyEndpoint,
    pub requires_token: bool,
    pub retry_delay: Duration,
    pub countdown_secs: u32,
    pub redirect: Arc<dyn RedirectResolver>,
    /// Where "go home" leads; `None` reuses the redirect resolver
    pub home: Option<Route>,
    pub support_whatsapp: String,
}

impl FlowConfig {
    /// Wallet top-up callback: signed-in users only, back to the wallet
    pub fn wallet_deposit(config: &VerificationConfig) -> Self {
        Self {
            name: "wallet_deposit",
            endpoint: VerifyEndpoint::Deposit,
            requires_token: true,
            retry_delay: config.retry_delay,
            countdown_secs: config.wallet_redirect_secs,
            redirect: Arc::new(FixedRedirect(Route::Wallet)),
            home: Some(Route::Dashboard),
            support_whatsapp: config.support_whatsapp.clone(),
        }
    }

    /// Storefront purchase callback: guests allowed, back to the store
    pub fn store_purchase(config: &VerificationConfig) -> Self {
        Self {
            name: "store_purchase",
            endpoint: VerifyEndpoint::Purchase,
            requires_token: false,
            retry_delay: config.retry_delay,
            countdown_secs: config.store_redirect_secs,
            redirect: Arc::new(StoreRedirect::default()),
            home: None,
            support_whatsapp: config.support_whatsapp.clone(),
        }
    }
}

pub struct VerificationController {
    api: Arc<dyn PaymentsApi>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    flow: FlowConfig,
    events: Option<EventSender>,
    state: VerificationState,
    reference: Option<String>,
    route_hint: Option<String>,
    token: Option<String>,
    pending: Option<PendingPurchase>,
    response_subdomain: Option<String>,
    redirect: Option<Route>,
    retry_count: u32,
    attempts: u32,
    countdown_started: bool,
}

impl VerificationController {
    pub fn new(
        api: Arc<dyn PaymentsApi>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
        flow: FlowConfig,
    ) -> Self {
        Self {
            api,
            session,
            navigator,
            flow,
            events: None,
            state: VerificationState::Verifying,
            reference: None,
            route_hint: None,
            token: None,
            pending: None,
            response_subdomain: None,
            redirect: None,
            retry_count: 0,
            attempts: 0,
            countdown_started: false,
        }
    }

    /// Publish every state change (and countdown tick) to a streaming host
    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    /// Transport retries taken in the current run
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Verification calls made over the controller's lifetime
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn redirect_route(&self) -> Option<&Route> {
        self.redirect.as_ref()
    }

    /// Verify the reference carried by the callback URL
    pub async fn start(&mut self, params: &CallbackParams) -> &VerificationState {
        self.route_hint = params.subdomain_hint().map(str::to_string);
        self.reference = params.payment_reference().map(str::to_string);

        if self.reference.is_none() {
            warn!(flow = self.flow.name, "Callback reached without a payment reference");
            self.finish(VerificationState::Error(VerificationError::missing_reference()))
                .await;
            return &self.state;
        }

        self.pending = match self.session.pending_purchase().await {
            Ok(pending) => pending,
            Err(e) => {
                warn!("Could not read pending purchase snapshot: {}", e);
                None
            }
        };

        self.begin().await
    }

    /// Whether the current terminal state offers the user a retry
    pub fn can_retry(&self) -> bool {
        self.state
            .error()
            .map(VerificationError::user_can_retry)
            .unwrap_or(false)
    }

    /// User-triggered retry from a failed or errored screen
    pub async fn retry(&mut self) -> &VerificationState {
        if !self.can_retry() {
            debug!(
                flow = self.flow.name,
                state = %self.state.phase(),
                "Ignoring retry request"
            );
            return &self.state;
        }

        info!(
            flow = self.flow.name,
            reference = self.reference.as_deref().unwrap_or_default(),
            "Retrying payment verification"
        );
        self.begin().await
    }

    async fn begin(&mut self) -> &VerificationState {
        self.retry_count = 0;
        self.token = match self.session.token().await {
            Ok(token) => token,
            Err(e) => {
                warn!("Could not read session token: {}", e);
                None
            }
        };

        if self.flow.requires_token && self.token.is_none() {
            warn!(flow = self.flow.name, "Verification needs a signed-in user");
            self.finish(VerificationState::Error(VerificationError::unauthenticated()))
                .await;
            return &self.state;
        }

        self.run().await
    }

    async fn run(&mut self) -> &VerificationState {
        let Some(reference) = self.reference.clone() else {
            return &self.state;
        };

        self.set_state(VerificationState::Verifying);

        loop {
            self.attempts += 1;
            info!(
                flow = self.flow.name,
                reference = %reference,
                attempt = self.attempts,
                retry_count = self.retry_count,
                "Verifying payment"
            );

            let outcome = self
                .api
                .verify_payment(self.flow.endpoint, &reference, self.token.as_deref())
                .await;

            match next_step(outcome, self.retry_count) {
                Step::Confirm { data, reconciled } => {
                    if reconciled {
                        warn!(
                            flow = self.flow.name,
                            reference = %reference,
                            "Backend reported failure with a completed status; accepting as success"
                        );
                    }
                    self.confirm(&reference, data, reconciled).await;
                    break;
                }
                Step::Decline(err) => {
                    info!(
                        flow = self.flow.name,
                        reference = %reference,
                        "Payment declined: {}",
                        err
                    );
                    self.finish(VerificationState::Failed(err)).await;
                    break;
                }
                Step::RetryLater(e) => {
                    self.retry_count += 1;
                    warn!(
                        flow = self.flow.name,
                        reference = %reference,
                        "Verification attempt failed, retrying after {:?}: {}",
                        self.flow.retry_delay,
                        e
                    );
                    tokio::time::sleep(self.flow.retry_delay).await;
                }
                Step::GiveUp(err) => {
                    error!(
                        flow = self.flow.name,
                        reference = %reference,
                        "Payment verification gave up: {}",
                        err
                    );
                    self.finish(VerificationState::Error(err)).await;
                    break;
                }
            }
        }

        &self.state
    }

    async fn confirm(&mut self, reference: &str, data: VerificationData, reconciled: bool) {
        self.response_subdomain = data.subdomain.clone();
        let payment = VerifiedPayment::merge(reference, data, self.pending.as_ref(), reconciled);
        let route = self.flow.redirect.resolve(&self.redirect_context());

        if let Some(balance) = payment.new_balance {
            if let Err(e) = self.session.set_cached_balance(balance).await {
                warn!("Could not cache new wallet balance: {}", e);
            }
        }
        if let Err(e) = self.session.clear_purchase_data().await {
            warn!("Could not clear cached purchase data: {}", e);
        }

        info!(
            target: "analytics",
            event = "payment_confirmed",
            flow = self.flow.name,
            reference = %payment.reference,
            amount = payment.amount.unwrap_or_default(),
            currency = CURRENCY_CODE,
        );

        self.redirect = Some(route);
        self.finish(VerificationState::Success(payment)).await;
    }

    async fn finish(&mut self, state: VerificationState) {
        if let Err(e) = self.session.clear_pending_purchase().await {
            warn!("Could not clear pending purchase snapshot: {}", e);
        }
        info!(
            flow = self.flow.name,
            state = %state.phase(),
            "Payment verification settled"
        );
        self.set_state(state);
    }

    fn set_state(&mut self, state: VerificationState) {
        self.state = state;
        if let Some(events) = &self.events {
            let _ = events.send(ControllerEvent::State(self.view()));
        }
    }

    fn redirect_context(&self) -> RedirectContext<'_> {
        RedirectContext {
            route_hint: self.route_hint.as_deref(),
            response_subdomain: self.response_subdomain.as_deref(),
            pending_subdomain: self.pending.as_ref().map(|p| p.subdomain.as_str()),
        }
    }

    fn home_route(&self) -> Route {
        self.flow
            .home
            .clone()
            .unwrap_or_else(|| self.flow.redirect.resolve(&self.redirect_context()))
    }

    /// Start the post-success redirect timer; at most once per success
    pub fn start_countdown(&mut self) -> Option<Countdown> {
        if self.countdown_started || !matches!(self.state, VerificationState::Success(_)) {
            return None;
        }
        let route = self.redirect.clone()?;
        self.countdown_started = true;

        info!(
            flow = self.flow.name,
            "Redirecting to {} in {}s",
            route,
            self.flow.countdown_secs
        );
        Some(Countdown::start(
            self.flow.countdown_secs,
            route,
            self.navigator.clone(),
            self.events.clone(),
        ))
    }

    pub fn view(&self) -> VerificationView {
        let support = RecoveryAction::ContactSupport {
            url: whatsapp_support_link(&self.flow.support_whatsapp, self.reference.as_deref())
                .path(),
        };
        let go_home = RecoveryAction::GoHome {
            to: self.home_route().path(),
        };

        let mut view = VerificationView {
            state: self.state.phase(),
            reference: self.reference.clone(),
            message: String::new(),
            amount: None,
            new_balance: None,
            paid_at: None,
            network: None,
            capacity: None,
            phone_number: None,
            redirect: None,
            actions: Vec::new(),
        };

        match &self.state {
            VerificationState::Verifying => {
                view.message = "Verifying your payment...".to_string();
            }
            VerificationState::Success(payment) => {
                let to = self
                    .redirect
                    .as_ref()
                    .map(Route::path)
                    .unwrap_or_else(|| self.home_route().path());

                view.message = "Payment successful".to_string();
                view.reference = Some(payment.reference.clone());
                view.amount = payment.amount.map(format_cedis);
                view.new_balance = payment.new_balance.map(format_cedis);
                view.paid_at = payment.paid_at.clone();
                view.network = payment.network.clone();
                view.capacity = payment.capacity.clone();
                view.phone_number = payment.phone_number.clone();
                view.redirect = Some(RedirectView {
                    to: to.clone(),
                    after_secs: self.flow.countdown_secs,
                });
                view.actions = vec![
                    RecoveryAction::Continue { to },
                    RecoveryAction::ViewTransactions {
                        to: Route::Transactions.path(),
                    },
                ];
            }
            VerificationState::Failed(err) => {
                view.message = err.message().to_string();
                view.actions = vec![RecoveryAction::Retry, support, go_home];
            }
            VerificationState::Error(err) => {
                view.message = err.message().to_string();
                if err.user_can_retry() {
                    view.actions.push(RecoveryAction::Retry);
                }
                if err.kind == VerificationErrorKind::Unauthenticated {
                    view.actions.push(RecoveryAction::SignIn {
                        to: Route::Login.path(),
                    });
                }
                view.actions.push(support);
                view.actions.push(go_home);
            }
        }

        view
    }
}
