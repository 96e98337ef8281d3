//! Page host tests: the axum router driven in-process with a stub backend.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio_stream::StreamExt;
use tower::ServiceExt;

use bundlepay_web::api::{router, AppState, SESSION_HEADER};
use bundlepay_web::config::Config;
use bundlepay_web::error::{ApiError, ApiResult};
use bundlepay_web::payments::types::{
    ApiEnvelope, DashboardSummary, DepositRequest, PaymentInitialization, PurchaseRequest,
    VerificationData, VerifyEndpoint, VerifyResponse,
};
use bundlepay_web::payments::PaymentsApi;
use bundlepay_web::storage::{KeyValueStore, MemoryStore, SessionStore};

struct StubApi {
    dashboard_up: bool,
    /// Declines the first verification of `ref_store_retry`
    store_retry_calls: AtomicUsize,
}

impl StubApi {
    fn new(dashboard_up: bool) -> Self {
        Self {
            dashboard_up,
            store_retry_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl PaymentsApi for StubApi {
    async fn verify_payment(
        &self,
        endpoint: VerifyEndpoint,
        reference: &str,
        _token: Option<&str>,
    ) -> ApiResult<VerifyResponse> {
        let declines_once = reference == "ref_store_retry"
            && self.store_retry_calls.fetch_add(1, Ordering::SeqCst) == 0;
        if reference == "ref_declined" || declines_once {
            return Ok(ApiEnvelope {
                success: false,
                message: Some("Insufficient funds".to_string()),
                data: None,
            });
        }

        let data = match endpoint {
            VerifyEndpoint::Deposit => VerificationData {
                status: Some("success".to_string()),
                amount: Some(50.0),
                reference: Some(reference.to_string()),
                new_balance: Some(150.0),
                ..Default::default()
            },
            VerifyEndpoint::Purchase => VerificationData {
                status: Some("success".to_string()),
                amount: Some(20.0),
                reference: Some(reference.to_string()),
                ..Default::default()
            },
        };
        Ok(ApiEnvelope {
            success: true,
            message: None,
            data: Some(data),
        })
    }

    async fn initialize_deposit(
        &self,
        _request: &DepositRequest,
        _token: &str,
    ) -> ApiResult<PaymentInitialization> {
        Ok(PaymentInitialization {
            authorization_url: "https://checkout.example.com/pay/dep".to_string(),
            reference: "ref_dep_1".to_string(),
            access_code: None,
        })
    }

    async fn initialize_purchase(
        &self,
        request: &PurchaseRequest,
        _token: Option<&str>,
    ) -> ApiResult<PaymentInitialization> {
        assert_eq!(request.phone_number, "0241234567");
        Ok(PaymentInitialization {
            authorization_url: "https://checkout.example.com/pay/store".to_string(),
            reference: "ref_store_1".to_string(),
            access_code: None,
        })
    }

    async fn dashboard_summary(&self, _token: &str) -> ApiResult<DashboardSummary> {
        if !self.dashboard_up {
            return Err(ApiError::Server { status: 503 });
        }
        Ok(DashboardSummary {
            wallet_balance: 1250.0,
            orders_today: 2,
            amount_spent_today: 30.0,
            recent_orders: Vec::new(),
        })
    }
}

struct TestApp {
    router: Router,
    api: Arc<StubApi>,
    store: Arc<MemoryStore>,
}

impl TestApp {
    fn new(dashboard_up: bool) -> Self {
        Self::with_redirect_secs(dashboard_up, 1)
    }

    fn with_redirect_secs(dashboard_up: bool, redirect_secs: u32) -> Self {
        let mut config = Config::default();
        config.verification.wallet_redirect_secs = redirect_secs;
        config.verification.store_redirect_secs = redirect_secs;
        config.verification.retry_delay = Duration::from_millis(10);

        let api = Arc::new(StubApi::new(dashboard_up));
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, api.clone(), store.clone());
        Self {
            router: router(state),
            api,
            store,
        }
    }

    fn session(&self, id: &str) -> SessionStore {
        SessionStore::new(self.store.clone() as Arc<dyn KeyValueStore>, id)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    async fn get(&self, uri: &str, session: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(session) = session {
            request = request.header(SESSION_HEADER, session);
        }
        let (status, body) = self.send(request.body(Body::empty()).unwrap()).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn post(&self, uri: &str, session: Option<&str>, body: Value) -> (StatusCode, Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(session) = session {
            request = request.header(SESSION_HEADER, session);
        }
        let (status, body) = self
            .send(request.body(Body::from(body.to_string())).unwrap())
            .await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    async fn signed_in(&self) -> String {
        let (status, body) = self.post("/session", None, json!({ "token": "jwt-token" })).await;
        assert_eq!(status, StatusCode::CREATED);
        body["sessionId"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(true);
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["sessionBackend"], "memory");
}

#[tokio::test]
async fn test_session_requires_token() {
    let app = TestApp::new(true);
    let (status, body) = app.post("/session", None, json!({ "token": "  " })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_wallet_callback_success_view() {
    let app = TestApp::new(true);
    let session = app.signed_in().await;

    let (status, view) = app
        .get("/wallet/deposit/callback?reference=ref_abc123", Some(&session))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "success");
    assert_eq!(view["amount"], "GH₵50.00");
    assert_eq!(view["newBalance"], "GH₵150.00");
    assert_eq!(view["redirect"], json!({ "to": "/wallet", "afterSecs": 1 }));
    assert_eq!(
        app.session(&session).cached_balance().await.unwrap(),
        Some(150.0)
    );
}

#[tokio::test]
async fn test_wallet_callback_without_reference() {
    let app = TestApp::new(true);
    let session = app.signed_in().await;

    let (status, view) = app.get("/wallet/deposit/callback", Some(&session)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "error");
    assert_eq!(view["message"], "No payment reference found");
    assert!(view.get("redirect").is_none());
}

#[tokio::test]
async fn test_wallet_callback_without_session_asks_to_sign_in() {
    let app = TestApp::new(true);

    let (_, view) = app
        .get("/wallet/deposit/callback?trxref=ref_abc123", None)
        .await;

    assert_eq!(view["state"], "error");
    assert_eq!(view["message"], "Please log in to verify your payment");
    let actions = view["actions"].as_array().unwrap();
    assert!(actions.contains(&json!({ "action": "sign_in", "to": "/login" })));
}

#[tokio::test]
async fn test_wallet_callback_declined_view() {
    let app = TestApp::new(true);
    let session = app.signed_in().await;

    let (_, view) = app
        .get("/wallet/deposit/callback?reference=ref_declined", Some(&session))
        .await;

    assert_eq!(view["state"], "failed");
    assert_eq!(view["message"], "Insufficient funds");
    assert_eq!(view["actions"][0], json!({ "action": "retry" }));
}

#[tokio::test]
async fn test_deposit_validation_and_auth() {
    let app = TestApp::new(true);

    let (status, body) = app
        .post("/wallet/deposit", None, json!({ "amount": 0.5 }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Minimum amount is GH₵1.00");

    let (status, _) = app
        .post("/wallet/deposit", None, json!({ "amount": 20 }))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let session = app.signed_in().await;
    let (status, body) = app
        .post("/wallet/deposit", Some(&session), json!({ "amount": 20 }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authorizationUrl"], "https://checkout.example.com/pay/dep");
    assert_eq!(body["reference"], "ref_dep_1");
}

#[tokio::test]
async fn test_store_purchase_then_callback() {
    let app = TestApp::new(true);
    let session = "guest-session";

    let (status, body) = app
        .post(
            "/store/kofi-data/purchase",
            Some(session),
            json!({
                "network": "MTN",
                "capacity": "5GB",
                "phoneNumber": "+233 24 123 4567",
                "amount": 20
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reference"], "ref_store_1");

    let pending = app.session(session).pending_purchase().await.unwrap().unwrap();
    assert_eq!(pending.subdomain, "kofi-data");
    assert_eq!(pending.phone_number, "0241234567");

    let (_, view) = app
        .get("/store/callback?reference=ref_store_1", Some(session))
        .await;
    assert_eq!(view["state"], "success");
    assert_eq!(view["phoneNumber"], "0241234567");
    assert_eq!(view["capacity"], "5GB");
    assert_eq!(view["redirect"]["to"], "/store/kofi-data");
    assert!(app
        .session(session)
        .pending_purchase()
        .await
        .unwrap()
        .is_none());
    assert!(app.session(session).purchase_data().await.unwrap().is_none());
}

#[tokio::test]
async fn test_store_purchase_rejects_bad_phone() {
    let app = TestApp::new(true);

    let (status, body) = app
        .post(
            "/store/kofi-data/purchase",
            None,
            json!({
                "network": "MTN",
                "capacity": "5GB",
                "phoneNumber": "12345",
                "amount": 20
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Enter a valid Ghana phone number");
}

#[tokio::test]
async fn test_dashboard_live_and_stale() {
    let app = TestApp::new(true);
    let session = app.signed_in().await;

    let (status, view) = app.get("/dashboard", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["walletBalance"], "GH₵1,250.00");
    assert_eq!(view["stale"], false);

    let down = TestApp::new(false);
    let (status, _) = down.get("/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let session = down.signed_in().await;
    let (status, _) = down.get("/dashboard", Some(&session)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    down.session(&session).set_cached_balance(80.5).await.unwrap();
    let (status, view) = down.get("/dashboard", Some(&session)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["walletBalance"], "GH₵80.50");
    assert_eq!(view["stale"], true);
}

#[tokio::test]
async fn test_footer() {
    let app = TestApp::new(true);
    let (status, view) = app.get("/footer", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["brand"], "BundlePay");
    assert!(view["supportUrl"]
        .as_str()
        .unwrap()
        .starts_with("https://wa.me/233000000000"));
}

#[tokio::test]
async fn test_callback_event_stream() {
    let app = TestApp::new(true);
    let session = app.signed_in().await;

    let request = Request::builder()
        .uri("/wallet/deposit/callback/events?reference=ref_abc123")
        .header(SESSION_HEADER, session.as_str())
        .body(Body::empty())
        .unwrap();
    let (status, body) = tokio::time::timeout(Duration::from_secs(5), app.send(request))
        .await
        .expect("stream ends after navigation");
    let body = String::from_utf8(body).unwrap();

    assert_eq!(status, StatusCode::OK);
    let verifying = body.find("\"state\":\"verifying\"").unwrap();
    let success = body.find("\"state\":\"success\"").unwrap();
    let tick = body.find("\"type\":\"tick\"").unwrap();
    let navigate = body.find("\"type\":\"navigate\"").unwrap();
    assert!(verifying < success && success < tick && tick < navigate);
    assert!(body.contains("\"to\":\"/wallet\""));
    assert_eq!(body.matches("\"type\":\"navigate\"").count(), 1);
}

#[tokio::test]
async fn test_store_retry_resumes_with_purchase_details() {
    let app = TestApp::new(true);
    let session = "store-retry-session";

    let (status, _) = app
        .post(
            "/store/kofi-data/purchase",
            Some(session),
            json!({
                "network": "MTN",
                "capacity": "5GB",
                "phoneNumber": "0241234567",
                "amount": 20
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = app
        .get("/store/callback?reference=ref_store_retry", Some(session))
        .await;
    assert_eq!(view["state"], "failed");
    assert!(view["actions"]
        .as_array()
        .unwrap()
        .contains(&json!({ "action": "go_home", "to": "/store/kofi-data" })));
    assert!(app
        .session(session)
        .pending_purchase()
        .await
        .unwrap()
        .is_none());

    let (status, view) = app
        .post(
            "/store/callback/retry?reference=ref_store_retry",
            Some(session),
            json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "success");
    assert_eq!(view["redirect"]["to"], "/store/kofi-data");
    assert_eq!(view["phoneNumber"], "0241234567");
    assert_eq!(view["capacity"], "5GB");
    assert_eq!(app.api.store_retry_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_retry_without_parked_page_verifies_afresh() {
    let app = TestApp::new(true);
    let session = app.signed_in().await;

    let (status, view) = app
        .post(
            "/wallet/deposit/callback/retry?reference=ref_abc123",
            Some(&session),
            json!({}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["state"], "success");
    assert_eq!(view["redirect"]["to"], "/wallet");
}

#[tokio::test(start_paused = true)]
async fn test_event_stream_disconnect_cancels_redirect() {
    let app = TestApp::with_redirect_secs(true, 5);
    let session = app.signed_in().await;
    let idle_handles = Arc::strong_count(&app.api);

    let request = Request::builder()
        .uri("/wallet/deposit/callback/events?reference=ref_abc123")
        .header(SESSION_HEADER, session.as_str())
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let mut frames = response.into_body().into_data_stream();
    let mut received = String::new();
    while !received.contains("\"state\":\"success\"") {
        let frame = frames.next().await.expect("stream open").unwrap();
        received.push_str(&String::from_utf8_lossy(&frame));
    }
    assert!(!received.contains("\"type\":\"navigate\""));

    let disconnected_at = tokio::time::Instant::now();
    drop(frames);

    // The verification task holds the api handle until it exits
    while Arc::strong_count(&app.api) > idle_handles {
        assert!(
            disconnected_at.elapsed() < Duration::from_secs(2),
            "verification task outlived its client"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(Arc::strong_count(&app.api), idle_handles);
}
