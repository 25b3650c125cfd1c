//! Contest Hub server - backend for the contest-entry web app.
//!
//! Serves the `users`, `contests` and `carts` collections over HTTP and issues
//! the session cookie used by the frontend.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Document store: `PostgreSQL` `JSONB` (or in-memory for development)
//! - HS256-signed session token carried in an `HttpOnly` cookie
//! - Sentry + tracing for error tracking and access logs

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::future::IntoFuture;
use std::time::Duration;

use contest_hub_server::config::ServerConfig;
use contest_hub_server::routes;
use contest_hub_server::state::AppState;
use contest_hub_server::store::AnyStore;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// How long graceful shutdown waits for open requests.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ServerConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let environment = if config.environment.is_production() {
        "production"
    } else {
        "development"
    };

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: Some(environment.into()),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = ServerConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "contest_hub_server=info,tower_http=debug".into());

    // JSON lines in production for log shipping, text locally
    let production = config.environment.is_production();
    let json_layer =
        production.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!production).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // One store handle for the life of the process; never closed explicitly.
    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p contest-hub-cli -- migrate
    let store = AnyStore::connect(&config.store)
        .await
        .expect("Failed to connect to document store");

    let state = AppState::new(config.clone(), store);
    let app = routes::app(state);

    let addr = config.socket_addr();
    tracing::info!("Server Running on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    // Requests on suppressed-fault routes never complete on their own, so
    // graceful shutdown is bounded.
    let (stopping_tx, mut stopping_rx) = tokio::sync::watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = stopping_tx.send(true);
        })
        .into_future();

    tokio::select! {
        result = server => result.expect("Server error"),
        () = async move {
            let _ = stopping_rx.wait_for(|stopping| *stopping).await;
            tokio::time::sleep(SHUTDOWN_GRACE_PERIOD).await;
        } => tracing::warn!("Shutdown grace period elapsed, abandoning open requests"),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
