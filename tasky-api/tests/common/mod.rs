/// Common test utilities for integration tests
///
/// Every test gets a fresh router over its own `MemoryStore`, so no database
/// is needed and tests can run in parallel.

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tasky_api::app::{build_router, AppState};
use tasky_api::config::Config;
use tasky_api::telemetry::Telemetry;
use tasky_shared::store::MemoryStore;
use tower::Service as _;
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// A logged-in user
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

impl TestUser {
    /// Returns authorization header value
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Returns cookie header value
    pub fn cookie_header(&self) -> String {
        format!("token={}", self.token)
    }
}

/// Test context containing the router and its config
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a router over an empty in-memory store
    pub fn new() -> Self {
        let vars: HashMap<&str, String> = HashMap::from([
            ("STORAGE_BACKEND", "memory".to_string()),
            ("SESSION_SECRET", SECRET.to_string()),
            (
                "ASSETS_DIR",
                concat!(env!("CARGO_MANIFEST_DIR"), "/../assets").to_string(),
            ),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned())
            .expect("test configuration should be valid");

        let state = AppState::new(Arc::new(MemoryStore::new()), config.clone());
        let app = build_router(state, &Telemetry::disabled());

        TestContext { app, config }
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().call(request).await.unwrap()
    }

    /// Sends a JSON request with an optional Bearer token
    pub async fn json(
        &self,
        method: &str,
        uri: &str,
        auth: Option<&TestUser>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = auth {
            builder = builder.header(header::AUTHORIZATION, user.auth_header());
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// Signs up and logs in a user
    pub async fn user(&self, username: &str) -> TestUser {
        let response = self
            .json(
                "POST",
                "/signup",
                None,
                Some(json!({ "username": username, "password": "x" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = self
            .json(
                "POST",
                "/login",
                None,
                Some(json!({ "username": username, "password": "x" })),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;

        TestUser {
            id: body["user_id"].as_str().unwrap().parse().unwrap(),
            username: username.to_string(),
            token: body["token"].as_str().unwrap().to_string(),
        }
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or_else(|e| {
        panic!("invalid JSON body {:?}: {}", String::from_utf8_lossy(&body), e)
    })
}

/// Reads a response body as text
pub async fn body_text(response: Response<Body>) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}
