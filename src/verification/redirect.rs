//! Where the browser goes after a confirmed payment.

use crate::navigation::Route;
use crate::validation::is_valid_subdomain;

/// Subdomain candidates gathered by the controller, highest priority first
#[derive(Debug, Clone, Copy, Default)]
pub struct RedirectContext<'a> {
    /// Explicit `subdomain` parameter on the callback URL
    pub route_hint: Option<&'a str>,
    /// Subdomain echoed in the verification response
    pub response_subdomain: Option<&'a str>,
    /// Subdomain from the cached pending-purchase snapshot
    pub pending_subdomain: Option<&'a str>,
}

pub trait RedirectResolver: Send + Sync {
    fn resolve(&self, context: &RedirectContext<'_>) -> Route;
}

/// Always the same destination; the wallet flow returns to the wallet
#[derive(Debug, Clone)]
pub struct FixedRedirect(pub Route);

impl RedirectResolver for FixedRedirect {
    fn resolve(&self, _context: &RedirectContext<'_>) -> Route {
        self.0.clone()
    }
}

/// Storefront flow: back to the store the purchase came from
#[derive(Debug, Clone)]
pub struct StoreRedirect {
    pub fallback: Route,
}

impl Default for StoreRedirect {
    fn default() -> Self {
        Self {
            fallback: Route::Home,
        }
    }
}

impl RedirectResolver for StoreRedirect {
    fn resolve(&self, context: &RedirectContext<'_>) -> Route {
        [
            context.route_hint,
            context.response_subdomain,
            context.pending_subdomain,
        ]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_ascii_lowercase())
        .find(|s| is_valid_subdomain(s))
        .map(Route::store)
        .unwrap_or_else(|| self.fallback.clone())
    }
}
