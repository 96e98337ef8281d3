//! Render models for the callback pages.

use serde::Serialize;
use tokio::sync::mpsc;

use super::state::Phase;

/// What a callback page shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationView {
    pub state: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<RedirectView>,
    pub actions: Vec<RecoveryAction>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectView {
    pub to: String,
    pub after_secs: u32,
}

/// Buttons offered on a terminal screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum RecoveryAction {
    Continue { to: String },
    Retry,
    SignIn { to: String },
    ContactSupport { url: String },
    ViewTransactions { to: String },
    GoHome { to: String },
}

/// Live updates for streaming hosts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControllerEvent {
    State(VerificationView),
    Tick { remaining: u32 },
    Navigate { to: String },
}

impl ControllerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ControllerEvent::State(_) => "state",
            ControllerEvent::Tick { .. } => "tick",
            ControllerEvent::Navigate { .. } => "navigate",
        }
    }
}

pub type EventSender = mpsc::UnboundedSender<ControllerEvent>;
