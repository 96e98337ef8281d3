//! Payment verification on the gateway callback pages
//!
//! After the payment gateway redirects back, the reference in the URL is
//! verified against the platform backend. Transport failures get one delayed
//! automatic retry; authoritative answers settle the page immediately. On
//! success the session is updated and the browser is sent on after a short
//! countdown.

pub mod controller;
pub mod countdown;
pub mod error;
pub mod machine;
pub mod redirect;
pub mod state;
pub mod view;

#[cfg(test)]
pub mod testing;

pub use controller::{CallbackParams, FlowConfig, VerificationController};
pub use countdown::Countdown;
pub use error::{VerificationError, VerificationErrorKind};
pub use redirect::{FixedRedirect, RedirectContext, RedirectResolver, StoreRedirect};
pub use state::{Phase, VerificationState, VerifiedPayment};
pub use view::{ControllerEvent, EventSender, RecoveryAction, RedirectView, VerificationView};
