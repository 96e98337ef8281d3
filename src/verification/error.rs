use std::fmt;

pub const NO_REFERENCE_MESSAGE: &str = "No payment reference found";
pub const SIGN_IN_MESSAGE: &str = "Please log in to verify your payment";
pub const DECLINED_FALLBACK_MESSAGE: &str = "Payment verification failed";
pub const TRANSPORT_MESSAGE: &str = "Unable to verify payment";

/// How a verification attempt went wrong, from the user's point of view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationErrorKind {
    /// The gateway redirect carried no reference; only a fresh payment helps
    MissingReference,
    /// No credential, or the backend refused it
    Unauthenticated,
    /// The backend authoritatively rejected the payment
    Declined { message: String },
    /// Network or malformed-response failure after the automatic retry
    Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationError {
    pub kind: VerificationErrorKind,
    pub context: Option<String>,
}

impl VerificationError {
    pub fn new(kind: VerificationErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    pub fn missing_reference() -> Self {
        Self::new(VerificationErrorKind::MissingReference)
    }

    pub fn unauthenticated() -> Self {
        Self::new(VerificationErrorKind::Unauthenticated)
    }

    /// Declined with the backend's message, or the generic fallback
    pub fn declined(message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DECLINED_FALLBACK_MESSAGE.to_string());
        Self::new(VerificationErrorKind::Declined { message })
    }

    pub fn transport() -> Self {
        Self::new(VerificationErrorKind::Transport)
    }

    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Whether calling the verification endpoint again can change the outcome
    pub fn user_can_retry(&self) -> bool {
        matches!(
            self.kind,
            VerificationErrorKind::Declined { .. } | VerificationErrorKind::Transport
        )
    }

    /// Text shown to the user; never includes internal context
    pub fn message(&self) -> &str {
        match &self.kind {
            VerificationErrorKind::MissingReference => NO_REFERENCE_MESSAGE,
            VerificationErrorKind::Unauthenticated => SIGN_IN_MESSAGE,
            VerificationErrorKind::Declined { message } => message,
            VerificationErrorKind::Transport => TRANSPORT_MESSAGE,
        }
    }
}

impl fmt::Display for VerificationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(context) = &self.context {
            write!(f, "{} ({})", self.message(), context)
        } else {
            write!(f, "{}", self.message())
        }
    }
}

impl std::error::Error for VerificationError {}
