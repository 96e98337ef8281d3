//! Client-side routes and the navigation capability used by page hosts.

use std::fmt;

use tokio::sync::mpsc;
use tracing::debug;

use crate::verification::{ControllerEvent, EventSender};

/// Destinations a page can send the browser to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Dashboard,
    Wallet,
    Transactions,
    Store { subdomain: String },
    External { url: String },
}

impl Route {
    pub fn store(subdomain: impl Into<String>) -> Self {
        Route::Store {
            subdomain: subdomain.into(),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Dashboard => "/dashboard".to_string(),
            Route::Wallet => "/wallet".to_string(),
            Route::Transactions => "/transactions".to_string(),
            Route::Store { subdomain } => format!("/store/{}", subdomain),
            Route::External { url } => url.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Performs a client-side navigation
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &Route);
}

/// Navigator for hosts that hand the redirect to the browser instead of
/// performing it themselves
#[derive(Debug, Default, Clone, Copy)]
pub struct DeferredNavigator;

impl Navigator for DeferredNavigator {
    fn navigate(&self, route: &Route) {
        debug!("Navigation to {} left to the client", route);
    }
}

/// Forwards navigations to a streaming client as events
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    events: EventSender,
}

impl ChannelNavigator {
    pub fn new(events: mpsc::UnboundedSender<ControllerEvent>) -> Self {
        Self { events }
    }
}

impl Navigator for ChannelNavigator {
    fn navigate(&self, route: &Route) {
        if self
            .events
            .send(ControllerEvent::Navigate { to: route.path() })
            .is_err()
        {
            debug!("Navigation to {} dropped, client gone", route);
        }
    }
}

/// WhatsApp deep link with a prefilled support message
pub fn whatsapp_support_link(number: &str, reference: Option<&str>) -> Route {
    let message = match reference {
        Some(reference) => format!(
            "Hello, I need help with my payment. Reference: {}",
            reference
        ),
        None => "Hello, I need help with my account.".to_string(),
    };
    let text: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();

    Route::External {
        url: format!("https://wa.me/{}?text={}", number, text),
    }
}
