//! HTTP middleware stack.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, one transaction per request)
//! 2. CORS (single allowed origin, credentialed requests)
//! 3. `TraceLayer` (access log: method, uri, status, latency)
//! 4. Request ID (propagate or generate `x-request-id`)

pub mod cors;
pub mod request_id;

pub use cors::cors_layer;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
