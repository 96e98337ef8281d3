//! Controllers parked on a retryable screen
//!
//! A failed callback page keeps its controller here so the user's retry
//! resumes it, with the pending-purchase snapshot it loaded before the
//! session copy was cleared.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

use crate::verification::VerificationController;

struct Parked {
    controller: VerificationController,
    parked_at: Instant,
}

pub struct RetryRegistry {
    parked: Mutex<HashMap<String, Parked>>,
    ttl: Duration,
}

impl RetryRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self {
            parked: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    pub fn key(flow: &str, session_id: &str, reference: &str) -> String {
        format!("{}:{}:{}", flow, session_id, reference)
    }

    /// Keep a controller until the user retries or it expires
    pub async fn park(&self, key: String, controller: VerificationController) {
        let mut parked = self.parked.lock().await;
        let ttl = self.ttl;
        parked.retain(|_, entry| entry.parked_at.elapsed() < ttl);

        debug!("Parking verification controller for retry: {}", key);
        parked.insert(
            key,
            Parked {
                controller,
                parked_at: Instant::now(),
            },
        );
    }

    /// Remove and return a parked controller, unless it has expired
    pub async fn take(&self, key: &str) -> Option<VerificationController> {
        let entry = self.parked.lock().await.remove(key)?;
        if entry.parked_at.elapsed() >= self.ttl {
            debug!("Parked verification controller expired: {}", key);
            return None;
        }
        Some(entry.controller)
    }

    pub async fn len(&self) -> usize {
        self.parked.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
