//! Platform backend integration
//!
//! Typed payloads, the `PaymentsApi` seam and its reqwest implementation.

pub mod client;
pub mod traits;
pub mod types;

pub use client::{BackendClient, BackendConfig};
pub use traits::PaymentsApi;
