//! Integration tests for Contest Hub.
//!
//! These run against a live server over HTTP and are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server (memory store is enough for everything but readiness)
//! CONTEST_STORE=memory ACCESS_TOKEN_SECRET=... cargo run -p contest-hub-server
//!
//! # Run integration tests
//! cargo test -p contest-hub-integration-tests -- --ignored
//! ```
//!
//! `SERVER_BASE_URL` points the tests at another deployment
//! (default: <http://localhost:5000>).

use reqwest::Client;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("SERVER_BASE_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// Absolute URL for `path` on the server under test.
#[must_use]
pub fn url(path: &str) -> String {
    format!("{}{path}", base_url())
}

/// A client that keeps cookies between requests, like a browser.
///
/// # Panics
///
/// Panics if the TLS backend cannot be initialised.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A unique e-mail address so concurrent runs don't see each other's carts.
#[must_use]
pub fn unique_email() -> String {
    format!("it-{}@example.com", uuid::Uuid::new_v4().simple())
}
