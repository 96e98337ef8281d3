//! Integration tests for the Redis session store
//!
//! These tests require a running Redis instance.
//! Run with: REDIS_URL=redis://localhost:6379 cargo test --features cache --test session_store_test -- --ignored

#[cfg(feature = "cache")]
mod redis_session_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use bundlepay_web::payments::types::PendingPurchase;
    use bundlepay_web::storage::{KeyValueStore, RedisStore, RedisStoreConfig, SessionStore};
    use uuid::Uuid;

    async fn setup_store(ttl: Duration) -> Arc<RedisStore> {
        let config = RedisStoreConfig {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            session_ttl: ttl,
            ..Default::default()
        };

        Arc::new(
            RedisStore::connect(&config)
                .await
                .expect("Failed to connect to Redis"),
        )
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_session_round_trip() {
        let store = setup_store(Duration::from_secs(60)).await;
        let session = SessionStore::new(store.clone(), Uuid::new_v4().to_string());

        session.set_token("jwt-token").await.unwrap();
        session.set_cached_balance(150.0).await.unwrap();
        session
            .set_pending_purchase(&PendingPurchase {
                amount: 20.0,
                phone_number: "0241234567".to_string(),
                subdomain: "kofi-data".to_string(),
                network: Some("MTN".to_string()),
                capacity: Some("5GB".to_string()),
                reference: None,
            })
            .await
            .unwrap();

        assert_eq!(session.token().await.unwrap().as_deref(), Some("jwt-token"));
        assert_eq!(session.cached_balance().await.unwrap(), Some(150.0));
        assert_eq!(
            session.pending_purchase().await.unwrap().unwrap().subdomain,
            "kofi-data"
        );

        session.clear_pending_purchase().await.unwrap();
        assert_eq!(session.pending_purchase().await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_sessions_are_isolated() {
        let store = setup_store(Duration::from_secs(60)).await;
        let alice = SessionStore::new(store.clone(), Uuid::new_v4().to_string());
        let bob = SessionStore::new(store.clone(), Uuid::new_v4().to_string());

        alice.set_token("alice-token").await.unwrap();

        assert_eq!(bob.token().await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_values_expire_after_ttl() {
        let store = setup_store(Duration::from_secs(1)).await;
        let key = format!("bundlepay:session:{}:token", Uuid::new_v4());

        store.set(&key, "short-lived").await.unwrap();
        assert!(store.get(&key).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(2_500)).await;
        assert_eq!(store.get(&key).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_health_check() {
        let store = setup_store(Duration::from_secs(60)).await;
        assert!(store.health_check().await.is_ok());
    }
}
