//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, LOCATION, SET_COOKIE};
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use portcullis_api::AppState;
use portcullis_auth::notify::SignupNotifier;
use portcullis_core::config::{AppConfig, HashingConfig, StoreBackend};
use portcullis_database::{MemoryUserStore, UserStore};
use portcullis_entity::user::User;
use portcullis_session::memory::MemorySessionBackend;

/// Collects every user handed to the notifier.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    users: Mutex<Vec<User>>,
}

impl RecordingNotifier {
    /// Emails notified so far, in order.
    pub fn notified(&self) -> Vec<String> {
        self.users
            .lock()
            .expect("notifier lock poisoned")
            .iter()
            .map(|u| u.email.clone())
            .collect()
    }
}

impl SignupNotifier for RecordingNotifier {
    fn notify_new_user(&self, user: &User) {
        self.users
            .lock()
            .expect("notifier lock poisoned")
            .push(user.clone());
    }
}

/// Test application context
///
/// Behaves like a browser: the session cookie from the last `Set-Cookie`
/// is sent with every following request.
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Direct access to committed users
    pub users: MemoryUserStore,
    /// Signup notifications
    pub notifier: Arc<RecordingNotifier>,
    /// Application config
    pub config: AppConfig,
    cookie: Mutex<Option<String>>,
}

impl TestApp {
    /// Create a new test application backed by in-memory stores
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let users = MemoryUserStore::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let backend = MemorySessionBackend::with_capacity(1_000);

        let state = AppState::new(
            config.clone(),
            Arc::new(users.clone()),
            Arc::new(backend),
            notifier.clone(),
        )
        .expect("Failed to build app state");

        Self {
            router: portcullis_api::build_app(state),
            users,
            notifier,
            config,
            cookie: Mutex::new(None),
        }
    }

    /// Forget the session cookie, like a fresh browser
    pub fn clear_cookie(&self) {
        *self.cookie.lock().expect("cookie lock poisoned") = None;
    }

    /// Replace the session cookie sent with following requests
    pub fn set_cookie(&self, pair: &str) {
        *self.cookie.lock().expect("cookie lock poisoned") = Some(pair.to_string());
    }

    /// The session cookie currently held, as `name=value`
    pub fn cookie(&self) -> Option<String> {
        self.cookie.lock().expect("cookie lock poisoned").clone()
    }

    /// Sign up and confirm an account, leaving the caller logged out
    pub async fn create_confirmed_user(&self, email: &str, password: &str) -> User {
        let response = self
            .request(
                "POST",
                "/auth/signup",
                Some(serde_json::json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "Signup failed: {:?}",
            response.body
        );

        let seed = self.confirm_seed(email).await;
        let response = self
            .request("GET", &format!("/auth/confirm/{seed}"), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);

        self.users
            .find_by_email(email)
            .await
            .expect("lookup failed")
            .expect("user missing after signup")
    }

    /// The pending confirmation seed for `email`
    pub async fn confirm_seed(&self, email: &str) -> String {
        self.users
            .find_by_email(email)
            .await
            .expect("lookup failed")
            .and_then(|u| u.email_confirm_seed)
            .expect("no pending confirmation seed")
    }

    /// Login and return the response
    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.request(
            "POST",
            "/auth/login",
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(CONTENT_TYPE, "application/json");

        if let Some(cookie) = self.cookie() {
            req = req.header(COOKIE, cookie);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Some(pair) = set_cookie
            .as_deref()
            .and_then(|c| c.split(';').next())
            .map(str::to_string)
        {
            *self.cookie.lock().expect("cookie lock poisoned") = Some(pair);
        }

        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            body,
            location,
            set_cookie,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
    /// `Location` header, if any
    pub location: Option<String>,
    /// Raw `Set-Cookie` header, if any
    pub set_cookie: Option<String>,
}

/// In-memory configuration with hashing cheap enough for tests
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.backend = StoreBackend::Memory;
    config.session.backend = StoreBackend::Memory;
    config.auth.hashing = HashingConfig {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    };
    config
}
