//! BundlePay web
//!
//! Backend-for-frontend for the data bundle storefront: page view models,
//! session state and the payment callback flows for wallet top-ups and
//! storefront purchases.

pub mod api;
pub mod config;
pub mod error;
pub mod format;
pub mod navigation;
pub mod payments;
pub mod storage;
pub mod validation;
pub mod verification;
