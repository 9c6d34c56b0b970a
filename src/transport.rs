// The network boundary. `ApiClient` talks to a `Transport`; the real one
// wraps a blocking reqwest client that never follows redirects, and tests
// substitute an in-memory one.

use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::{multipart, Client};
use reqwest::header::{HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, LOCATION, RETRY_AFTER};
use reqwest::redirect;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::api::HttpMethod;
use crate::credentials::Credential;
use crate::error::Result;

/// Request body kinds supported by the API.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    /// Single file upload plus optional text fields.
    Multipart {
        file_field: String,
        file: PathBuf,
        fields: Vec<(String, String)>,
    },
}

/// A fully resolved request, ready to hand to a transport.
#[derive(Debug)]
pub struct PreparedRequest<'a> {
    pub method: HttpMethod,
    pub url: Url,
    pub bearer: Option<&'a Credential>,
    pub body: &'a RequestBody,
}

/// What came back over the wire, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub location: Option<String>,
    pub retry_after: Option<String>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            location: None,
            retry_after: None,
            body: body.into(),
        }
    }
}

/// Failures below the HTTP layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Timeouts, failed connects and dropped connections may succeed on a
    /// second try.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}

/// Sends one HTTP request. Implementations must not follow redirects.
pub trait Transport {
    fn send(
        &self,
        request: &PreparedRequest<'_>,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportError>;
}

/// Blocking reqwest client with redirects disabled.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .user_agent(concat!("moltbook-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn send(
        &self,
        request: &PreparedRequest<'_>,
        timeout: Duration,
    ) -> std::result::Result<RawResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.as_reqwest(), request.url.clone())
            .timeout(timeout)
            .header(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(credential) = request.bearer {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", credential.expose()))
                .map_err(|_| {
                    TransportError::Other(
                        "API key contains characters that are not valid in an HTTP header".into(),
                    )
                })?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(body) => builder.json(body),
            RequestBody::Multipart {
                file_field,
                file,
                fields,
            } => {
                let mut form = multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                let form = form.file(file_field.clone(), file).map_err(|e| {
                    TransportError::Other(format!("failed to read {}: {e}", file.display()))
                })?;
                builder.multipart(form)
            }
        };

        debug!(method = request.method.as_str(), url = %request.url, "Sending request");
        let response = builder.send().map_err(classify_error)?;

        let status = response.status().as_u16();
        let header = |name: HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|h| h.to_str().ok())
                .map(str::to_string)
        };
        let location = header(LOCATION);
        let retry_after = header(RETRY_AFTER);
        let body = response.text().map_err(classify_error)?;

        Ok(RawResponse {
            status,
            location,
            retry_after,
            body,
        })
    }
}

fn classify_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else if error.is_connect() || is_dropped_connection(&error) {
        TransportError::Connect(error_chain(&error))
    } else {
        TransportError::Other(error_chain(&error))
    }
}

/// hyper's message for a connection closed before the response was complete.
const INCOMPLETE_MESSAGE: &str = "connection closed before message completed";

/// An established connection that was reset or closed mid-exchange.
fn is_dropped_connection(error: &reqwest::Error) -> bool {
    if error.is_builder() || error.is_redirect() {
        return false;
    }
    let mut current: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(error);
    while let Some(source) = current {
        if let Some(io) = source.downcast_ref::<std::io::Error>() {
            if is_dropped_io_kind(io.kind()) {
                return true;
            }
        }
        if source.to_string().contains(INCOMPLETE_MESSAGE) {
            return true;
        }
        current = source.source();
    }
    false
}

fn is_dropped_io_kind(kind: std::io::ErrorKind) -> bool {
    use std::io::ErrorKind;
    matches!(
        kind,
        ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::UnexpectedEof
    )
}

/// Flatten an error and its sources into one line.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut current: Option<&(dyn std::error::Error + 'static)> = std::error::Error::source(error);
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}
