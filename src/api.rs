// API client module: builds request URLs from descriptors, refuses anything
// outside the allow-listed origin, sends through a `Transport` and retries
// read-only requests on transient failures.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::config::{SessionConfig, ALLOWED_ORIGIN, API_PREFIX, DEFAULT_BASE_URL};
use crate::credentials::Credential;
use crate::error::{CliError, Result};
use crate::outcome::Outcome;
use crate::transport::{PreparedRequest, RequestBody, ReqwestTransport, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Options,
    Post,
    Put,
    Patch,
    Delete,
}

/// Which methods may be retried automatically. Only reads are safe to
/// repeat; everything else is left for the operator to re-trigger.
const RETRY_ELIGIBLE: &[(HttpMethod, bool)] = &[
    (HttpMethod::Get, true),
    (HttpMethod::Head, true),
    (HttpMethod::Options, true),
    (HttpMethod::Post, false),
    (HttpMethod::Put, false),
    (HttpMethod::Patch, false),
    (HttpMethod::Delete, false),
];

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    pub fn is_retry_eligible(self) -> bool {
        RETRY_ELIGIBLE
            .iter()
            .find(|(method, _)| *method == self)
            .is_some_and(|(_, eligible)| *eligible)
    }
}

/// One API call, described before it is sent.
///
/// `path` is relative to the API prefix and may contain `{}` segments,
/// filled in order from `param` calls. Parameters are percent-encoded as
/// single path segments.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    method: HttpMethod,
    path: String,
    params: Vec<String>,
    query: Vec<(String, String)>,
    body: RequestBody,
    authenticated: bool,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            query: Vec::new(),
            body: RequestBody::Empty,
            authenticated: true,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Fill the next `{}` placeholder.
    pub fn param(mut self, value: impl Into<String>) -> Self {
        self.params.push(value.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(
        mut self,
        file_field: impl Into<String>,
        file: impl Into<PathBuf>,
        fields: Vec<(String, String)>,
    ) -> Self {
        self.body = RequestBody::Multipart {
            file_field: file_field.into(),
            file: file.into(),
            fields,
        };
        self
    }

    /// Send without the Authorization header (agent registration).
    pub fn unauthenticated(mut self) -> Self {
        self.authenticated = false;
        self
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn body(&self) -> &RequestBody {
        &self.body
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Path segments with placeholders substituted.
    pub fn segments(&self) -> Result<Vec<String>> {
        let mut params = self.params.iter();
        let mut segments = Vec::new();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            if segment == "{}" {
                let value = params.next().ok_or_else(|| {
                    CliError::validation(format!("missing path parameter for {}", self.path))
                })?;
                segments.push(value.clone());
            } else {
                segments.push(segment.to_string());
            }
        }
        if params.next().is_some() {
            return Err(CliError::validation(format!(
                "too many path parameters for {}",
                self.path
            )));
        }
        Ok(segments)
    }
}

/// Bounded exponential backoff for retry-eligible requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure; doubles each time.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// Guarded client for the Moltbook API.
pub struct ApiClient {
    base_url: String,
    allowed_origin: Url,
    retry: RetryPolicy,
    transport: Box<dyn Transport>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("allowed_origin", &self.allowed_origin.as_str())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    allowed_origin: Option<String>,
    retry: Option<RetryPolicy>,
    transport: Option<Box<dyn Transport>>,
}

impl ApiClientBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Replace the allow-listed origin. Only local test servers need this.
    pub fn allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = Some(origin.into());
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn transport(mut self, transport: Box<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let origin = self.allowed_origin.unwrap_or_else(|| ALLOWED_ORIGIN.to_string());
        let allowed_origin = Url::parse(&origin)
            .map_err(|_| CliError::UnsafeOrigin { url: origin.clone() })?;
        let transport = match self.transport {
            Some(t) => t,
            None => Box::new(ReqwestTransport::new()?),
        };
        Ok(ApiClient {
            base_url: self
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            allowed_origin,
            retry: self.retry.unwrap_or_default(),
            transport,
        })
    }
}

impl ApiClient {
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fail early when the configured base URL is outside the allow-list.
    pub fn ensure_safe_base_url(&self) -> Result<()> {
        match Url::parse(&self.base_url) {
            Ok(url) if self.is_allowed(&url) => Ok(()),
            _ => Err(CliError::UnsafeOrigin {
                url: self.base_url.clone(),
            }),
        }
    }

    /// Full URL for a request, without checking the origin.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|_| CliError::UnsafeOrigin {
            url: self.base_url.clone(),
        })?;
        let segments = request.segments()?;
        {
            let mut path = url.path_segments_mut().map_err(|_| CliError::UnsafeOrigin {
                url: self.base_url.clone(),
            })?;
            path.pop_if_empty().extend(segments.iter().map(String::as_str));
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(request.query.iter());
        }
        Ok(url)
    }

    fn is_allowed(&self, url: &Url) -> bool {
        let path = url.path();
        let under_prefix = path == API_PREFIX
            || path
                .strip_prefix(API_PREFIX)
                .is_some_and(|rest| rest.starts_with('/'));
        url.origin() == self.allowed_origin.origin()
            && url.username().is_empty()
            && url.password().is_none()
            && under_prefix
    }

    /// Perform one call. Never panics and never returns an error: every
    /// result, including refusals, is an `Outcome`.
    pub fn call(
        &self,
        request: &ApiRequest,
        credential: &Credential,
        config: &SessionConfig,
    ) -> Outcome {
        let url = match self.url_for(request) {
            Ok(url) => url,
            Err(CliError::UnsafeOrigin { url }) => {
                warn!(url = %url, "Refusing request to unparseable base URL");
                return Outcome::unsafe_origin(url);
            }
            Err(e) => {
                return Outcome::TransportFailure {
                    message: e.to_string(),
                    body: serde_json::json!({"success": false, "error": e.to_string()}),
                };
            }
        };
        if !self.is_allowed(&url) {
            warn!(url = %url, "Refusing request outside the allow-listed origin");
            return Outcome::unsafe_origin(url.as_str());
        }

        let prepared = PreparedRequest {
            method: request.method,
            url,
            bearer: request.authenticated.then_some(credential),
            body: &request.body,
        };

        let attempts = if request.method.is_retry_eligible() {
            self.retry.max_attempts.max(1)
        } else {
            1
        };

        let mut attempt = 1;
        loop {
            let result = self.transport.send(&prepared, config.timeout);
            let retryable = match &result {
                Ok(raw) => (500..600).contains(&raw.status),
                Err(e) => e.is_transient(),
            };
            if retryable && attempt < attempts {
                let delay = self.retry.delay_for(attempt);
                debug!(
                    method = request.method.as_str(),
                    path = %prepared.url.path(),
                    attempt,
                    max_attempts = attempts,
                    backoff_ms = delay.as_millis() as u64,
                    "Transient failure, retrying"
                );
                thread::sleep(delay);
                attempt += 1;
                continue;
            }

            let outcome = match result {
                Ok(raw) => Outcome::from_response(raw),
                Err(e) => Outcome::from_transport_error(&e, config.timeout),
            };
            debug!(
                method = request.method.as_str(),
                path = %prepared.url.path(),
                attempts = attempt,
                outcome = outcome.label(),
                status = ?outcome.status(),
                "Request finished"
            );
            return outcome;
        }
    }
}
