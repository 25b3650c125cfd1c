//! Router-level tests against the in-memory document store.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, HeaderValue, Method, Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;

use contest_hub_core::Collection;

use super::app;
use crate::config::{Environment, ServerConfig, StoreConfig};
use crate::gateway::{FaultPolicy, Operation, RouteTable, Verb};
use crate::error::FAULT_BODY;
use crate::middleware::REQUEST_ID_HEADER;
use crate::routes::health::LIVENESS_TEXT;
use crate::state::AppState;
use crate::store::{AnyStore, MemoryDocumentStore};

const FRONTEND_ORIGIN: &str = "http://localhost:5173";

struct TestApp {
    state: AppState,
    router: Router,
}

impl TestApp {
    fn new(environment: Environment) -> Self {
        let config = ServerConfig {
            store: StoreConfig::Memory,
            host: "127.0.0.1".parse().unwrap(),
            port: 0,
            environment,
            cors_origin: HeaderValue::from_static(FRONTEND_ORIGIN),
            token_secret: SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
            sentry_dsn: None,
        };
        let state = AppState::new(config, MemoryDocumentStore::new());
        let router = app(state.clone());
        Self { state, router }
    }

    /// Serve `table` alone instead of the contest routes.
    fn with_table(environment: Environment, table: RouteTable) -> Self {
        let Self { state, .. } = Self::new(environment);
        let router = table.into_router().with_state(state.clone());
        Self { state, router }
    }

    fn set_store_online(&self, online: bool) {
        let AnyStore::Memory(memory) = self.state.store() else {
            panic!("test app uses the in-memory store");
        };
        memory.set_online(online);
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Bytes) {
        self.send(request(method, uri, body)).await
    }

    async fn json(&self, method: Method, uri: &str, body: Option<Value>) -> Value {
        let (status, _, bytes) = self.call(method, uri, body).await;
        assert_eq!(status, StatusCode::OK, "{uri}: {bytes:?}");
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Whether `request` is still unanswered after a short wait.
    async fn hangs(&self, request: Request<Body>) -> bool {
        tokio::time::timeout(
            Duration::from_millis(200),
            self.router.clone().oneshot(request),
        )
        .await
        .is_err()
    }
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn raw_request(uri: &str, content_type: Option<&str>, body: &'static str) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(value) = content_type {
        builder = builder.header(header::CONTENT_TYPE, value);
    }
    builder.body(Body::from(body)).unwrap()
}

fn set_cookie(headers: &HeaderMap) -> String {
    headers
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

// ============================================================================
// Liveness & readiness
// ============================================================================

#[tokio::test]
async fn test_liveness_text() {
    let app = TestApp::new(Environment::Development);
    let (status, _, body) = app.call(Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, LIVENESS_TEXT.as_bytes());
}

#[tokio::test]
async fn test_readiness_follows_store() {
    let app = TestApp::new(Environment::Development);
    assert_eq!(app.call(Method::GET, "/health/ready", None).await.0, StatusCode::OK);

    app.set_store_online(false);
    assert_eq!(
        app.call(Method::GET, "/health/ready", None).await.0,
        StatusCode::SERVICE_UNAVAILABLE
    );
}

// ============================================================================
// Collections
// ============================================================================

#[tokio::test]
async fn test_create_then_list_each_collection() {
    let app = TestApp::new(Environment::Development);

    for (path, body) in [
        ("/users", json!({"email": "ada@example.com", "name": "Ada"})),
        ("/contests", json!({"title": "Spring Fest", "prize": 500})),
        ("/carts", json!({"email": "ada@example.com", "contestId": "c-1"})),
    ] {
        let ack = app.json(Method::POST, path, Some(body.clone())).await;
        assert_eq!(ack["acknowledged"], json!(true));
        let id = ack["insertedId"].as_str().unwrap().to_string();

        let listed = app.json(Method::GET, path, None).await;
        let mut expected = json!({"_id": id});
        expected
            .as_object_mut()
            .unwrap()
            .extend(body.as_object().unwrap().clone());
        assert_eq!(listed, json!([expected]), "{path}");
    }
}

#[tokio::test]
async fn test_list_empty_collection() {
    let app = TestApp::new(Environment::Development);
    assert_eq!(app.json(Method::GET, "/contests", None).await, json!([]));
}

#[tokio::test]
async fn test_fields_come_back_in_submitted_order() {
    let app = TestApp::new(Environment::Development);
    let ack = app
        .json(
            Method::POST,
            "/contests",
            Some(json!({"title": "Spring Fest", "fee": 5, "a": true})),
        )
        .await;
    let id = ack["insertedId"].as_str().unwrap();

    let (_, _, body) = app
        .call(Method::GET, &format!("/contests/{id}"), None)
        .await;
    assert_eq!(
        String::from_utf8(body.to_vec()).unwrap(),
        format!(r#"{{"_id":"{id}","title":"Spring Fest","fee":5,"a":true}}"#)
    );
}

#[tokio::test]
async fn test_create_without_json_content_type_inserts_empty_document() {
    let app = TestApp::new(Environment::Development);

    for (uri, content_type) in [("/users", None), ("/carts", Some("text/plain"))] {
        let (status, _, body) = app
            .send(raw_request(uri, content_type, r#"{"email": "a@example.com"}"#))
            .await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        let ack: Value = serde_json::from_slice(&body).unwrap();
        let id = ack["insertedId"].as_str().unwrap();

        assert_eq!(app.json(Method::GET, uri, None).await, json!([{"_id": id}]));
    }
}

#[tokio::test]
async fn test_create_with_empty_json_body_inserts_empty_document() {
    let app = TestApp::new(Environment::Development);
    let (status, _, _) = app
        .send(raw_request("/contests", Some("application/json"), ""))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        app.json(Method::GET, "/contests", None).await[0]
            .as_object()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_contest_lifecycle() {
    let app = TestApp::new(Environment::Development);

    let ack = app
        .json(Method::POST, "/contests", Some(json!({"title": "Spring Fest"})))
        .await;
    let id = ack["insertedId"].as_str().unwrap().to_string();
    let uri = format!("/contests/{id}");

    assert_eq!(
        app.json(Method::GET, &uri, None).await,
        json!({"_id": id, "title": "Spring Fest"})
    );

    let deleted = app.json(Method::DELETE, &uri, None).await;
    assert_eq!(deleted, json!({"acknowledged": true, "deletedCount": 1}));

    let (status, _, body) = app.call(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_delete_unknown_id_reports_zero() {
    let app = TestApp::new(Environment::Development);
    let uri = "/users/3f2b8c1e-9a4d-4e2f-8b7a-1c2d3e4f5a6b";
    assert_eq!(
        app.json(Method::DELETE, uri, None).await,
        json!({"acknowledged": true, "deletedCount": 0})
    );
}

#[tokio::test]
async fn test_delete_is_scoped_to_collection() {
    let app = TestApp::new(Environment::Development);
    let ack = app
        .json(Method::POST, "/contests", Some(json!({"title": "Spring Fest"})))
        .await;
    let id = ack["insertedId"].as_str().unwrap();

    let deleted = app
        .json(Method::DELETE, &format!("/carts/{id}"), None)
        .await;
    assert_eq!(deleted["deletedCount"], json!(0));
    assert_eq!(app.json(Method::GET, "/contests", None).await.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_cart_delete_by_id() {
    let app = TestApp::new(Environment::Development);
    let ack = app
        .json(Method::POST, "/carts", Some(json!({"email": "a@example.com"})))
        .await;
    let id = ack["insertedId"].as_str().unwrap();

    let deleted = app
        .json(Method::DELETE, &format!("/carts/{id}"), None)
        .await;
    assert_eq!(deleted["deletedCount"], json!(1));
    assert_eq!(app.json(Method::GET, "/carts", None).await, json!([]));
}

#[tokio::test]
async fn test_get_carts_ignores_email_filter() {
    let app = TestApp::new(Environment::Development);
    app.json(Method::POST, "/carts", Some(json!({"email": "a@example.com"})))
        .await;
    app.json(Method::POST, "/carts", Some(json!({"email": "b@example.com"})))
        .await;

    for uri in ["/carts", "/carts?email=a@example.com", "/carts?email=nobody@example.com"] {
        let carts = app.json(Method::GET, uri, None).await;
        assert_eq!(carts.as_array().unwrap().len(), 2, "{uri}");
    }
}

#[tokio::test]
async fn test_no_update_route() {
    let app = TestApp::new(Environment::Development);
    let (status, _, _) = app
        .call(
            Method::PUT,
            "/users/3f2b8c1e-9a4d-4e2f-8b7a-1c2d3e4f5a6b",
            Some(json!({"name": "x"})),
        )
        .await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

// ============================================================================
// Faults
// ============================================================================

#[tokio::test]
async fn test_malformed_id_is_an_unhandled_fault() {
    let app = TestApp::new(Environment::Development);
    for (method, uri) in [
        (Method::DELETE, "/users/not-an-id"),
        (Method::GET, "/contests/not-an-id"),
        (Method::DELETE, "/contests/not-an-id"),
        (Method::DELETE, "/carts/not-an-id"),
    ] {
        let (status, _, body) = app.call(method, uri, None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(body, FAULT_BODY.as_bytes());
    }
}

#[tokio::test]
async fn test_malformed_body_follows_fault_policy() {
    let app = TestApp::new(Environment::Development);

    for body in ["[1,2]", "{broken", "\"text\""] {
        // Suppress
        assert!(
            app.hangs(raw_request("/users", Some("application/json"), body))
                .await,
            "/users {body}"
        );
        assert!(
            app.hangs(raw_request("/contests", Some("application/json"), body))
                .await,
            "/contests {body}"
        );

        // Propagate
        let (status, _, bytes) = app
            .send(raw_request("/carts", Some("application/json"), body))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "/carts {body}");
        assert_eq!(bytes, FAULT_BODY.as_bytes());
    }

    assert_eq!(app.json(Method::GET, "/carts", None).await, json!([]));
}

#[tokio::test]
async fn test_suppressed_store_faults_never_answer() {
    let app = TestApp::new(Environment::Development);
    app.set_store_online(false);

    assert!(app.hangs(request(Method::GET, "/users", None)).await);
    assert!(app.hangs(request(Method::POST, "/users", Some(json!({"a": 1})))).await);
    assert!(app.hangs(request(Method::GET, "/contests", None)).await);
    assert!(app.hangs(request(Method::POST, "/contests", Some(json!({"a": 1})))).await);
}

#[tokio::test]
async fn test_propagated_store_faults_are_500() {
    let app = TestApp::new(Environment::Development);
    app.set_store_online(false);

    for (method, uri, body) in [
        (Method::GET, "/carts", None),
        (Method::POST, "/carts", Some(json!({"a": 1}))),
        (Method::GET, "/contests/3f2b8c1e-9a4d-4e2f-8b7a-1c2d3e4f5a6b", None),
        (Method::DELETE, "/users/3f2b8c1e-9a4d-4e2f-8b7a-1c2d3e4f5a6b", None),
    ] {
        let (status, _, bytes) = app.call(method, uri, body).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
        assert_eq!(bytes, FAULT_BODY.as_bytes());
    }
}

// ============================================================================
// Field filter (served only when it is the active binding)
// ============================================================================

fn cart_filter_table() -> RouteTable {
    RouteTable::new()
        .bind(Verb::Post, "/carts", Collection::Carts, Operation::Create, FaultPolicy::Propagate)
        .bind(Verb::Get, "/carts", Collection::Carts, Operation::List, FaultPolicy::Propagate)
        .bind(
            Verb::Get,
            "/carts",
            Collection::Carts,
            Operation::FilterByField {
                field: "email".to_string(),
            },
            FaultPolicy::Propagate,
        )
}

#[tokio::test]
async fn test_filter_by_field_matches_string_equality() {
    let app = TestApp::with_table(Environment::Development, cart_filter_table());
    for body in [
        json!({"email": "a@example.com", "n": 1}),
        json!({"email": "b@example.com", "n": 2}),
        json!({"email": "a@example.com", "n": 3}),
        json!({"email": 5, "n": 4}),
    ] {
        app.json(Method::POST, "/carts", Some(body)).await;
    }

    let carts = app
        .json(Method::GET, "/carts?email=a@example.com", None)
        .await;
    let numbers: Vec<_> = carts.as_array().unwrap().iter().map(|c| c["n"].clone()).collect();
    assert_eq!(numbers, [json!(1), json!(3)]);

    // Only string values match.
    assert_eq!(app.json(Method::GET, "/carts?email=5", None).await, json!([]));
    assert_eq!(
        app.json(Method::GET, "/carts?email=nobody@example.com", None).await,
        json!([])
    );
}

#[tokio::test]
async fn test_filter_by_field_without_parameter_matches_nothing() {
    let app = TestApp::with_table(Environment::Development, cart_filter_table());
    app.json(Method::POST, "/carts", Some(json!({"email": "a@example.com"})))
        .await;

    assert_eq!(app.json(Method::GET, "/carts", None).await, json!([]));
    assert_eq!(app.json(Method::GET, "/carts?other=1", None).await, json!([]));
}

#[tokio::test]
async fn test_filter_by_field_store_fault_is_500() {
    let app = TestApp::with_table(Environment::Development, cart_filter_table());
    app.set_store_online(false);

    let (status, _, bytes) = app
        .call(Method::GET, "/carts?email=a@example.com", None)
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(bytes, FAULT_BODY.as_bytes());
}

// ============================================================================
// Session
// ============================================================================

#[tokio::test]
async fn test_issue_then_revoke_token_cookie() {
    let app = TestApp::new(Environment::Development);

    let (status, headers, body) = app
        .call(Method::POST, "/jwt", Some(json!({"id": "u1"})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"success": true}));

    let issued = set_cookie(&headers);
    assert!(issued.starts_with("token="));
    assert!(issued.contains("HttpOnly"));
    assert!(issued.contains("SameSite=Strict"));
    assert!(!issued.contains("Secure"));
    assert!(!String::from_utf8_lossy(&body).contains("eyJ"));

    let (status, headers, body) = app.call(Method::GET, "/logout", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"success": true}));

    let cleared = set_cookie(&headers);
    assert!(cleared.starts_with("token=;"));
    assert!(cleared.contains("Max-Age=0"));
    assert!(cleared.contains("SameSite=Strict"));
}

#[tokio::test]
async fn test_production_cookie_flags() {
    let app = TestApp::new(Environment::Production);

    let (_, headers, _) = app
        .call(Method::POST, "/jwt", Some(json!({"id": "u1"})))
        .await;
    let issued = set_cookie(&headers);
    assert!(issued.contains("HttpOnly"));
    assert!(issued.contains("Secure"));
    assert!(issued.contains("SameSite=None"));

    let (_, headers, _) = app.call(Method::GET, "/logout", None).await;
    let cleared = set_cookie(&headers);
    assert!(cleared.contains("Secure"));
    assert!(cleared.contains("SameSite=None"));
}

#[tokio::test]
async fn test_issue_without_json_content_type_signs_empty_claims() {
    let app = TestApp::new(Environment::Development);
    let (status, headers, body) = app
        .send(raw_request("/jwt", None, r#"{"id": "u1"}"#))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(set_cookie(&headers).starts_with("token="));
    assert_eq!(serde_json::from_slice::<Value>(&body).unwrap(), json!({"success": true}));
}

#[tokio::test]
async fn test_issue_with_non_object_claims_is_a_fault() {
    let app = TestApp::new(Environment::Development);
    for body in ["[1]", "{broken"] {
        let (status, headers, bytes) = app
            .send(raw_request("/jwt", Some("application/json"), body))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{body}");
        assert_eq!(bytes, FAULT_BODY.as_bytes());
        assert!(headers.get(header::SET_COOKIE).is_none());
    }
}

#[tokio::test]
async fn test_logout_without_cookie_succeeds() {
    let app = TestApp::new(Environment::Development);
    let request = Request::builder()
        .uri("/logout")
        .header(header::COOKIE, "unrelated=1")
        .body(Body::empty())
        .unwrap();
    let (status, _, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_routes_do_not_touch_store() {
    let app = TestApp::new(Environment::Development);
    app.set_store_online(false);

    let (status, _, _) = app
        .call(Method::POST, "/jwt", Some(json!({"id": "u1"})))
        .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Middleware
// ============================================================================

#[tokio::test]
async fn test_cors_preflight_allows_configured_origin_with_credentials() {
    let app = TestApp::new(Environment::Development);
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/contests")
        .header(header::ORIGIN, FRONTEND_ORIGIN)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = app.send(request).await;
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        FRONTEND_ORIGIN
    );
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
        "true"
    );
}

#[tokio::test]
async fn test_cors_simple_request_from_configured_origin() {
    let app = TestApp::new(Environment::Development);
    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, FRONTEND_ORIGIN)
        .body(Body::empty())
        .unwrap();

    let (status, headers, _) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        FRONTEND_ORIGIN
    );
}

#[tokio::test]
async fn test_cors_rejects_other_origins() {
    let app = TestApp::new(Environment::Development);
    let request = Request::builder()
        .uri("/")
        .header(header::ORIGIN, "https://evil.example")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = app.send(request).await;
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let app = TestApp::new(Environment::Development);

    let request = Request::builder()
        .uri("/")
        .header(REQUEST_ID_HEADER, "req-42")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = app.send(request).await;
    assert_eq!(headers.get(REQUEST_ID_HEADER).unwrap(), "req-42");

    let (_, headers, _) = app.call(Method::GET, "/", None).await;
    let generated = headers.get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_unsafe_request_id_is_replaced() {
    let app = TestApp::new(Environment::Development);
    let request = Request::builder()
        .uri("/")
        .header(REQUEST_ID_HEADER, "id with spaces")
        .body(Body::empty())
        .unwrap();

    let (_, headers, _) = app.send(request).await;
    let replaced = headers.get(REQUEST_ID_HEADER).unwrap().to_str().unwrap();
    assert!(uuid::Uuid::parse_str(replaced).is_ok());
}
