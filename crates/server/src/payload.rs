//! Request bodies as documents.
//!
//! Bodies are read as raw bytes and decoded here rather than by axum's `Json`
//! extractor, so a bad body is an ordinary fault handled by the route's
//! [`FaultPolicy`](crate::gateway::FaultPolicy) instead of a 4xx rejection.
//!
//! | Request | Document |
//! |---|---|
//! | no `Content-Type`, or not `application/json` | `{}` |
//! | `application/json`, empty body | `{}` |
//! | `application/json`, a JSON object | that object |
//! | `application/json`, anything else | [`PayloadError`] |

use axum::http::{HeaderMap, header::CONTENT_TYPE};
use serde_json::Value;
use thiserror::Error;

use contest_hub_core::Document;

/// A JSON request body that cannot become a document.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("body is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Whether the request declares a JSON body.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

/// Decode a request body into a document.
///
/// # Errors
///
/// Returns `PayloadError` if a JSON-typed body is malformed or is not an
/// object.
pub fn document_from_body(headers: &HeaderMap, body: &[u8]) -> Result<Document, PayloadError> {
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::new());
    }

    match serde_json::from_slice::<Value>(body)? {
        Value::Object(document) => Ok(document),
        Value::Array(_) => Err(PayloadError::NotAnObject("array")),
        Value::String(_) => Err(PayloadError::NotAnObject("string")),
        Value::Number(_) => Err(PayloadError::NotAnObject("number")),
        Value::Bool(_) => Err(PayloadError::NotAnObject("boolean")),
        Value::Null => Err(PayloadError::NotAnObject("null")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = content_type {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(value));
        }
        headers
    }

    #[test]
    fn test_object_body() {
        let doc = document_from_body(
            &headers(Some("application/json")),
            br#"{"title": "Spring Fest", "fee": 5}"#,
        )
        .unwrap();
        assert_eq!(doc.keys().collect::<Vec<_>>(), ["title", "fee"]);
    }

    #[test]
    fn test_content_type_parameters_and_case() {
        let doc = document_from_body(
            &headers(Some("Application/JSON; charset=utf-8")),
            br#"{"a": 1}"#,
        )
        .unwrap();
        assert_eq!(doc["a"], 1);
    }

    #[test]
    fn test_non_json_content_type_is_empty_document() {
        for content_type in [None, Some("text/plain"), Some("application/x-www-form-urlencoded")] {
            let doc = document_from_body(&headers(content_type), br#"{"a": 1}"#).unwrap();
            assert!(doc.is_empty(), "{content_type:?}");
        }
    }

    #[test]
    fn test_empty_json_body_is_empty_document() {
        assert!(document_from_body(&headers(Some("application/json")), b"").unwrap().is_empty());
        assert!(document_from_body(&headers(Some("application/json")), b" \n").unwrap().is_empty());
    }

    #[test]
    fn test_non_object_json_is_rejected() {
        let json = headers(Some("application/json"));
        assert!(matches!(
            document_from_body(&json, b"[1,2]").unwrap_err(),
            PayloadError::NotAnObject("array")
        ));
        assert!(matches!(
            document_from_body(&json, b"null").unwrap_err(),
            PayloadError::NotAnObject("null")
        ));
        assert!(matches!(
            document_from_body(&json, b"{broken").unwrap_err(),
            PayloadError::Json(_)
        ));
    }
}
