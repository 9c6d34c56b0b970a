//! Behaviour of `ApiClient::call` against an in-memory transport.
//!
//! Covers origin enforcement (no I/O on refusal), the retry table for
//! read vs. write methods, and body normalization of non-JSON replies.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use moltbook_cli::api::{ApiClient, ApiRequest, RetryPolicy};
use moltbook_cli::config::SessionConfig;
use moltbook_cli::credentials::Credential;
use moltbook_cli::endpoints;
use moltbook_cli::outcome::Outcome;
use moltbook_cli::transport::{PreparedRequest, RawResponse, Transport, TransportError};

const TOKEN: &str = "moltbook_abcdef1234";

type Reply = Result<RawResponse, TransportError>;

#[derive(Clone, Default)]
struct FakeTransport {
    calls: Rc<Cell<usize>>,
    replies: Rc<RefCell<VecDeque<Reply>>>,
    timeouts: Rc<RefCell<Vec<Duration>>>,
    bearers: Rc<RefCell<Vec<Option<String>>>>,
}

impl FakeTransport {
    fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let t = Self::default();
        t.replies.borrow_mut().extend(replies);
        t
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &PreparedRequest<'_>, timeout: Duration) -> Reply {
        self.calls.set(self.calls.get() + 1);
        self.timeouts.borrow_mut().push(timeout);
        self.bearers
            .borrow_mut()
            .push(request.bearer.map(|c| c.expose().to_string()));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Ok(RawResponse::new(200, "{}")))
    }
}

fn client(transport: &FakeTransport, base_url: &str) -> ApiClient {
    ApiClient::builder()
        .base_url(base_url)
        .retry(RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::ZERO,
        })
        .transport(Box::new(transport.clone()))
        .build()
        .unwrap()
}

fn credential() -> Credential {
    Credential::parse(TOKEN).unwrap()
}

fn ok(status: u16, body: &str) -> Reply {
    Ok(RawResponse::new(status, body))
}

#[test]
fn test_unsafe_origins_never_touch_the_network() {
    let transport = FakeTransport::default();
    for base in [
        "https://moltbook.com/api/v1",
        "http://www.moltbook.com/api/v1",
        "https://www.moltbook.com.attacker.example/api/v1",
        "https://attacker.example/api/v1",
        "https://www.moltbook.com:444/api/v1",
        "https://www.moltbook.com/elsewhere",
        "garbage",
    ] {
        let outcome = client(&transport, base).call(
            &endpoints::me(),
            &credential(),
            &SessionConfig::default(),
        );
        assert!(
            matches!(outcome, Outcome::UnsafeOrigin { .. }),
            "{base} was not refused: {outcome:?}"
        );
    }
    assert_eq!(transport.calls.get(), 0);
}

#[test]
fn test_get_retries_once_after_transient_503() {
    let transport = FakeTransport::with_replies([ok(503, "busy"), ok(200, r#"{"success":true}"#)]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::me(),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(transport.calls.get(), 2);
}

#[test]
fn test_get_retries_after_timeout() {
    let transport = FakeTransport::with_replies([
        Err(TransportError::Timeout),
        ok(200, r#"{"success":true}"#),
    ]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::me(),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(outcome.status(), Some(200));
    assert_eq!(transport.calls.get(), 2);
}

#[test]
fn test_get_retries_after_connection_reset() {
    let transport = FakeTransport::with_replies([
        Err(TransportError::Connect("connection reset by peer".into())),
        ok(200, r#"{"success":true}"#),
    ]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::global_feed("hot", 25, None),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(outcome.is_success(), "{outcome:?}");
    assert_eq!(transport.calls.get(), 2);
}

#[test]
fn test_post_is_never_retried() {
    let transport = FakeTransport::with_replies([ok(503, "busy"), ok(200, "{}")]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::upvote_post("p1"),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(matches!(outcome, Outcome::ServerError { status: 503, .. }));
    assert_eq!(transport.calls.get(), 1);
}

#[test]
fn test_delete_timeout_is_not_retried() {
    let transport = FakeTransport::with_replies([Err(TransportError::Timeout), ok(200, "{}")]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::delete_post("p1"),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(matches!(outcome, Outcome::Timeout { .. }));
    assert_eq!(transport.calls.get(), 1);
}

#[test]
fn test_get_gives_up_after_bounded_attempts() {
    let transport = FakeTransport::with_replies([
        ok(502, ""),
        Err(TransportError::Connect("connection reset".into())),
        ok(504, ""),
        ok(200, "{}"),
    ]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::list_submolts(),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(matches!(outcome, Outcome::ServerError { status: 504, .. }));
    assert_eq!(transport.calls.get(), 3);
}

#[test]
fn test_rate_limit_is_not_retried() {
    let transport = FakeTransport::with_replies([ok(429, r#"{"retry_after_minutes":1}"#)]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::personal_feed("hot", 25),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(outcome.is_rate_limited());
    assert_eq!(transport.calls.get(), 1);
}

#[test]
fn test_non_transient_transport_error_is_surfaced() {
    let transport =
        FakeTransport::with_replies([Err(TransportError::Other("invalid certificate".into()))]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::me(),
        &credential(),
        &SessionConfig::default(),
    );
    match outcome {
        Outcome::TransportFailure { message, body } => {
            assert!(message.contains("invalid certificate"));
            assert_eq!(body["success"], false);
        }
        other => panic!("expected transport failure, got {other:?}"),
    }
    assert_eq!(transport.calls.get(), 1);
}

#[test]
fn test_html_bodies_are_wrapped_not_rejected() {
    let transport = FakeTransport::with_replies([
        ok(200, "<html>maintenance</html>"),
        ok(404, "<html>Not Found</html>"),
    ]);
    let c = client(&transport, "https://www.moltbook.com/api/v1");
    let config = SessionConfig::default();

    match c.call(&endpoints::me(), &credential(), &config) {
        Outcome::Success { status, body } => {
            assert_eq!(status, 200);
            assert_eq!(body["raw"], "<html>maintenance</html>");
            assert_eq!(body["hint"], "Response was not JSON.");
        }
        other => panic!("expected success, got {other:?}"),
    }
    match c.call(&endpoints::get_post("nope"), &credential(), &config) {
        Outcome::ClientError { status, body } => {
            assert_eq!(status, 404);
            assert_eq!(body["raw"], "<html>Not Found</html>");
        }
        other => panic!("expected client error, got {other:?}"),
    }
}

#[test]
fn test_redirects_are_reported() {
    let mut raw = RawResponse::new(301, "");
    raw.location = Some("https://moltbook.com/api/v1/agents/me".into());
    let transport = FakeTransport::with_replies([Ok(raw)]);
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &endpoints::me(),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(matches!(outcome, Outcome::Redirected { status: 301, .. }));
    assert_eq!(transport.calls.get(), 1);
}

#[test]
fn test_session_timeout_and_bearer_are_passed_down() {
    let transport = FakeTransport::default();
    let c = client(&transport, "https://www.moltbook.com/api/v1");
    let mut config = SessionConfig::default();
    config.set_timeout_secs(9).unwrap();

    c.call(&endpoints::me(), &credential(), &config);
    c.call(&endpoints::register("crab", "hi"), &credential(), &config);

    assert_eq!(transport.timeouts.borrow().as_slice(), &[Duration::from_secs(9); 2]);
    assert_eq!(
        transport.bearers.borrow().as_slice(),
        &[Some(TOKEN.to_string()), None]
    );
}

#[test]
fn test_placeholder_mismatch_is_not_sent() {
    let transport = FakeTransport::default();
    let outcome = client(&transport, "https://www.moltbook.com/api/v1").call(
        &ApiRequest::get("/posts/{}"),
        &credential(),
        &SessionConfig::default(),
    );
    assert!(matches!(outcome, Outcome::TransportFailure { .. }));
    assert_eq!(transport.calls.get(), 0);
}
