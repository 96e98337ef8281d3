//! Per-session key-value state
//!
//! Stands in for the browser's local storage: the page hosts keep the auth
//! token, an optimistic wallet balance and the pending purchase snapshot here,
//! namespaced by session id.

pub mod error;
pub mod keys;
pub mod memory;
#[cfg(feature = "cache")]
pub mod redis_store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
#[cfg(feature = "cache")]
pub use redis_store::{RedisStore, RedisStoreConfig};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::payments::types::{PendingPurchase, PurchaseRequest};
use keys::SessionKey;

/// String-valued key-value backend
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Returns whether a value was present
    async fn remove(&self, key: &str) -> StoreResult<bool>;
}

const ANONYMOUS_SESSION_ID: &str = "anonymous";

/// Typed view of one browser session
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    session_id: String,
}

impl SessionStore {
    pub fn new(store: Arc<dyn KeyValueStore>, session_id: impl Into<String>) -> Self {
        Self {
            store,
            session_id: session_id.into(),
        }
    }

    /// A throwaway session for requests that carry no session id
    pub fn anonymous() -> Self {
        Self::new(Arc::new(MemoryStore::new()), ANONYMOUS_SESSION_ID)
    }

    pub fn is_anonymous(&self) -> bool {
        self.session_id == ANONYMOUS_SESSION_ID
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    fn key(&self, field: &str) -> String {
        SessionKey::new(&self.session_id, field).to_string()
    }

    pub async fn token(&self) -> StoreResult<Option<String>> {
        let token = self.store.get(&self.key(keys::TOKEN)).await?;
        Ok(token.filter(|t| !t.trim().is_empty()))
    }

    pub async fn set_token(&self, token: &str) -> StoreResult<()> {
        self.store.set(&self.key(keys::TOKEN), token).await
    }

    pub async fn cached_balance(&self) -> StoreResult<Option<f64>> {
        let key = self.key(keys::WALLET_BALANCE);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };

        match raw.parse::<f64>() {
            Ok(balance) if balance.is_finite() => Ok(Some(balance)),
            _ => {
                warn!("Ignoring unparseable cached balance for key '{}'", key);
                Ok(None)
            }
        }
    }

    pub async fn set_cached_balance(&self, balance: f64) -> StoreResult<()> {
        self.store
            .set(&self.key(keys::WALLET_BALANCE), &balance.to_string())
            .await
    }

    pub async fn pending_purchase(&self) -> StoreResult<Option<PendingPurchase>> {
        self.get_json(keys::PENDING_PURCHASE).await
    }

    pub async fn set_pending_purchase(&self, pending: &PendingPurchase) -> StoreResult<()> {
        self.set_json(keys::PENDING_PURCHASE, pending).await
    }

    pub async fn clear_pending_purchase(&self) -> StoreResult<()> {
        self.store.remove(&self.key(keys::PENDING_PURCHASE)).await?;
        Ok(())
    }

    /// The last storefront form the user submitted
    pub async fn purchase_data(&self) -> StoreResult<Option<PurchaseRequest>> {
        self.get_json(keys::PURCHASE_DATA).await
    }

    pub async fn set_purchase_data(&self, request: &PurchaseRequest) -> StoreResult<()> {
        self.set_json(keys::PURCHASE_DATA, request).await
    }

    pub async fn clear_purchase_data(&self) -> StoreResult<()> {
        self.store.remove(&self.key(keys::PURCHASE_DATA)).await?;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, field: &str) -> StoreResult<Option<T>> {
        let key = self.key(field);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Ignoring malformed session value for key '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    async fn set_json<T: Serialize>(&self, field: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.store.set(&self.key(field), &raw).await
    }
}
