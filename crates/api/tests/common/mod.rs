//! Common test utilities for integration tests.
//!
//! The router runs over the in-memory store with a manual clock, so no
//! database is needed. Identity tokens are minted with the HS256 secret of
//! the embedded test configuration.

// Not every test binary uses every helper.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use court_reservations_api::{
    app::{create_app, AppState},
    config::Config,
};
use domain::models::Court;
use domain::store::CourtStore;
use domain::{InMemoryStore, ManualClock};
use serde_json::{json, Value};
use shared::identity::{sign_with_secret, IdentityClaims};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

/// Shared secret of `Config::load_for_test`.
pub const TEST_SECRET: &str = "test-identity-secret";

/// Date every test books on; the clock starts at 08:00 of this day.
pub const TODAY: &str = "2026-06-01";

pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 8, 0, 0).unwrap()
}

pub struct TestContext {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
}

impl TestContext {
    /// Sends one request through a clone of the router.
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    pub async fn court_named(&self, name: &str) -> Court {
        self.store
            .list_courts()
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == name)
            .unwrap_or_else(|| panic!("no court named {}", name))
    }

    pub fn advance(&self, by: Duration) {
        self.clock.advance(by);
    }
}

/// Router over a fresh in-memory store holding the standard catalog.
pub async fn setup() -> TestContext {
    let config = Config::load_for_test(&[("database.url", "postgres://unused")])
        .expect("Failed to load test config");
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(test_now()));

    let state = AppState::new(config, store.clone(), clock.clone()).expect("Failed to build state");
    state
        .services
        .courts
        .ensure_catalog()
        .await
        .expect("Failed to seed catalog");

    TestContext {
        app: create_app(state),
        store,
        clock,
    }
}

fn token(sub: &str, name: &str, role: Option<&str>) -> String {
    let now = Utc::now();
    let claims = IdentityClaims {
        sub: sub.to_string(),
        exp: (now + Duration::hours(1)).timestamp(),
        iat: Some(now.timestamp()),
        name: Some(name.to_string()),
        email: Some(format!("{}@example.com", sub)),
        role: role.map(str::to_string),
    };
    sign_with_secret(&claims, TEST_SECRET).unwrap()
}

pub fn user_token(sub: &str, name: &str) -> String {
    token(sub, name, None)
}

pub fn admin_token() -> String {
    token("admin-1", "Admin", Some("admin"))
}

/// Build a JSON request with authentication.
pub fn json_request_with_auth(method: Method, uri: &str, body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

/// Build a POST request without a body.
pub fn post_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Build a GET request with authentication.
pub fn get_request_with_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}

/// Books a slot on the test day through the API.
pub async fn book(
    ctx: &TestContext,
    token: &str,
    court_id: Uuid,
    time: &str,
    party_size: i32,
) -> Response {
    ctx.send(json_request_with_auth(
        Method::POST,
        "/api/v1/reservations",
        json!({
            "courtId": court_id,
            "date": TODAY,
            "time": time,
            "partySize": party_size,
        }),
        token,
    ))
    .await
}

/// Books a slot that must succeed and returns the reservation id.
pub async fn book_ok(ctx: &TestContext, token: &str, court_id: Uuid, time: &str) -> String {
    let response = book(ctx, token, court_id, time, 4).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    parse_response_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Approves a reservation as admin.
pub async fn approve(ctx: &TestContext, reservation_id: &str) -> Response {
    ctx.send(post_request_with_auth(
        &format!("/api/v1/admin/reservations/{}/approve", reservation_id),
        &admin_token(),
    ))
    .await
}
