// Terminal states of one API call and the normalization of response bodies
// into something the presenter can always pretty-print.

use serde_json::{json, Map, Value};
use std::time::Duration;

use crate::transport::{RawResponse, TransportError};

/// How one call ended.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// 2xx.
    Success { status: u16, body: Value },
    /// 4xx. 429 is kept here and flagged by `is_rate_limited`.
    ClientError { status: u16, body: Value },
    /// 5xx, after any retries the method allowed.
    ServerError { status: u16, body: Value },
    /// 3xx; the redirect was not followed.
    Redirected {
        status: u16,
        location: Option<String>,
        body: Value,
    },
    Timeout { after: Duration, body: Value },
    /// DNS, connection, TLS or body-read failures.
    TransportFailure { message: String, body: Value },
    /// Refused before any network I/O.
    UnsafeOrigin { url: String, body: Value },
}

impl Outcome {
    pub fn from_response(raw: RawResponse) -> Self {
        let status = raw.status;
        let mut body = normalize_body(status, &raw.body);
        match status {
            200..=299 => Self::Success { status, body },
            300..=399 => {
                if let Some(map) = body.as_object_mut() {
                    map.entry("warning").or_insert_with(|| {
                        json!("Redirect received and not followed. Ensure you use https://www.moltbook.com with www.")
                    });
                    if let Some(loc) = &raw.location {
                        map.entry("location").or_insert_with(|| json!(loc));
                    }
                }
                Self::Redirected {
                    status,
                    location: raw.location,
                    body,
                }
            }
            400..=499 => {
                if status == 429 {
                    if let Some(map) = body.as_object_mut() {
                        map.entry("hint").or_insert_with(|| {
                            json!("Rate limit hit. See retry_after_* fields if present.")
                        });
                        if let Some(retry_after) = &raw.retry_after {
                            map.entry("retry_after_header")
                                .or_insert_with(|| json!(retry_after));
                        }
                    }
                }
                Self::ClientError { status, body }
            }
            500..=599 => Self::ServerError { status, body },
            _ => Self::TransportFailure {
                message: format!("unexpected HTTP status {status}"),
                body,
            },
        }
    }

    pub fn from_transport_error(error: &TransportError, timeout: Duration) -> Self {
        let body = json!({
            "success": false,
            "error": error.to_string(),
            "hint": "Check network connectivity and base URL.",
        });
        match error {
            TransportError::Timeout => Self::Timeout {
                after: timeout,
                body,
            },
            _ => Self::TransportFailure {
                message: error.to_string(),
                body,
            },
        }
    }

    pub fn unsafe_origin(url: impl Into<String>) -> Self {
        let url = url.into();
        let body = json!({
            "success": false,
            "error": format!("Refusing to use unsafe URL {url:?}"),
            "hint": "Requests are only sent to https://www.moltbook.com/api/v1.",
        });
        Self::UnsafeOrigin { url, body }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Success { status, .. }
            | Self::ClientError { status, .. }
            | Self::ServerError { status, .. }
            | Self::Redirected { status, .. } => Some(*status),
            Self::Timeout { .. } | Self::TransportFailure { .. } | Self::UnsafeOrigin { .. } => {
                None
            }
        }
    }

    pub fn body(&self) -> &Value {
        match self {
            Self::Success { body, .. }
            | Self::ClientError { body, .. }
            | Self::ServerError { body, .. }
            | Self::Redirected { body, .. }
            | Self::Timeout { body, .. }
            | Self::TransportFailure { body, .. }
            | Self::UnsafeOrigin { body, .. } => body,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::ClientError { status: 429, .. })
    }

    /// Short name of the terminal state.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::ClientError { .. } => "client error",
            Self::ServerError { .. } => "server error",
            Self::Redirected { .. } => "redirected",
            Self::Timeout { .. } => "timeout",
            Self::TransportFailure { .. } => "transport failure",
            Self::UnsafeOrigin { .. } => "unsafe origin",
        }
    }
}

/// Turn a response body into a JSON object.
///
/// Objects pass through; other JSON values go under `data`; anything that
/// is not JSON goes under `raw` with a hint. `status_code` is always set.
pub fn normalize_body(status: u16, text: &str) -> Value {
    let ok = (200..300).contains(&status);
    let mut map = if text.trim().is_empty() {
        let mut m = Map::new();
        m.insert("success".into(), json!(ok));
        m
    } else {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(m)) => m,
            Ok(other) => {
                let mut m = Map::new();
                m.insert("success".into(), json!(ok));
                m.insert("data".into(), other);
                m
            }
            Err(_) => {
                let mut m = Map::new();
                m.insert("success".into(), json!(ok));
                m.insert("raw".into(), json!(text));
                m.insert("hint".into(), json!("Response was not JSON."));
                m
            }
        }
    };
    map.entry("status_code").or_insert_with(|| json!(status));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_body_gets_status_code() {
        let body = normalize_body(200, r#"{"success":true,"agent":{"name":"x"}}"#);
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["agent"]["name"], "x");
    }

    #[test]
    fn test_existing_status_code_is_kept() {
        let body = normalize_body(200, r#"{"status_code":"custom"}"#);
        assert_eq!(body["status_code"], "custom");
    }

    #[test]
    fn test_array_body_is_wrapped() {
        let body = normalize_body(200, "[1,2]");
        assert_eq!(body["data"], json!([1, 2]));
        assert_eq!(body["success"], true);
    }

    #[test]
    fn test_html_body_is_wrapped_as_raw() {
        let body = normalize_body(502, "<html>Bad Gateway</html>");
        assert_eq!(body["raw"], "<html>Bad Gateway</html>");
        assert_eq!(body["hint"], "Response was not JSON.");
        assert_eq!(body["success"], false);
        assert_eq!(body["status_code"], 502);
    }

    #[test]
    fn test_empty_body() {
        let body = normalize_body(204, "");
        assert_eq!(body, json!({"success": true, "status_code": 204}));
    }

    #[test]
    fn test_classification_by_status() {
        assert!(Outcome::from_response(RawResponse::new(201, "{}")).is_success());
        assert!(matches!(
            Outcome::from_response(RawResponse::new(404, "{}")),
            Outcome::ClientError { status: 404, .. }
        ));
        assert!(matches!(
            Outcome::from_response(RawResponse::new(503, "")),
            Outcome::ServerError { status: 503, .. }
        ));
    }

    #[test]
    fn test_rate_limit_hint() {
        let mut raw = RawResponse::new(429, r#"{"error":"slow down"}"#);
        raw.retry_after = Some("30".into());
        let outcome = Outcome::from_response(raw);
        assert!(outcome.is_rate_limited());
        assert!(outcome.body()["hint"].as_str().unwrap().contains("Rate limit"));
        assert_eq!(outcome.body()["retry_after_header"], "30");
    }

    #[test]
    fn test_redirect_carries_location() {
        let mut raw = RawResponse::new(301, "");
        raw.location = Some("https://moltbook.com/api/v1/agents/me".into());
        match Outcome::from_response(raw) {
            Outcome::Redirected { location, body, .. } => {
                assert_eq!(location.as_deref(), Some("https://moltbook.com/api/v1/agents/me"));
                assert_eq!(body["location"], "https://moltbook.com/api/v1/agents/me");
                assert!(body["warning"].is_string());
            }
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    #[test]
    fn test_transport_error_outcomes() {
        let t = Outcome::from_transport_error(&TransportError::Timeout, Duration::from_secs(5));
        assert!(matches!(t, Outcome::Timeout { .. }));
        assert_eq!(t.status(), None);

        let f = Outcome::from_transport_error(
            &TransportError::Connect("dns error".into()),
            Duration::from_secs(5),
        );
        assert!(matches!(f, Outcome::TransportFailure { .. }));
        assert_eq!(f.body()["success"], false);
    }
}
