//! Authenticated HTTP client for versioned SIEM REST APIs.
//!
//! `ApiClient` wraps a `reqwest::Client` configured once from a
//! [`ClientConfig`]: a default header template (`Accept`, optional
//! `Version`, and exactly one of `SEC` or `Authorization`), a TLS context
//! honouring the configured trust anchor, and fixed timeouts. Each
//! [`call`](ApiClient::call) performs exactly one HTTPS round trip.
//!
//! Two rules shape the call contract:
//!
//! - **HTTP errors are data.** A 4xx/5xx response is returned as a normal
//!   [`ApiResponse`] with its body intact, because the server's error
//!   payloads (auth failures, removed-version notices, range-syntax
//!   complaints) are what the caller needs to see. Only transport-level
//!   faults — DNS, TCP, TLS, timeouts — surface as `Err`.
//! - **Caller headers win.** Per-request headers are merged over the
//!   default template; on a key collision the caller's value replaces the
//!   default, and no duplicate-key headers are ever produced.
//!
//! The client holds no mutable state between calls and is intended for
//! sequential reuse; give each concurrent workflow its own instance.

use bytes::Bytes;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{ClientConfig, Credential};
use crate::error::{ApiError, Result};
use crate::paging::{ContentRange, PageWindow};

/// All endpoints live under this base path on the server.
const BASE_PATH: &str = "/api/";

/// Advisory response header set by the server when the requested API
/// version is scheduled for removal.
const DEPRECATED_HEADER: &str = "Deprecated";

/// Connect timeout: TCP + TLS handshake only.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall round-trip timeout, generous enough for large CSV result pages.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Characters percent-encoded in query parameter values: everything outside
/// RFC 3986 unreserved.
const QUERY_VALUE_ENCODE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

// ── Request ────────────────────────────────────────────────────────────

/// A logical API call: endpoint, method, ordered headers and query
/// parameters, and an optional body.
///
/// Headers and query parameters keep the order they were supplied in.
/// Query parameters with an empty value are omitted entirely from the
/// serialized query string (never sent as `key=`).
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub(crate) endpoint: String,
    pub(crate) method: Method,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) query: Vec<(String, String)>,
    pub(crate) body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Creates a request for the given method and endpoint path.
    /// A leading `/` on the endpoint is accepted and stripped at send time.
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        ApiRequest {
            endpoint: endpoint.into(),
            method,
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Shorthand for a GET request.
    pub fn get(endpoint: impl Into<String>) -> Self {
        ApiRequest::new(Method::GET, endpoint)
    }

    /// Shorthand for a POST request.
    pub fn post(endpoint: impl Into<String>) -> Self {
        ApiRequest::new(Method::POST, endpoint)
    }

    /// Shorthand for a DELETE request.
    pub fn delete(endpoint: impl Into<String>) -> Self {
        ApiRequest::new(Method::DELETE, endpoint)
    }

    /// Shorthand for a PUT request.
    pub fn put(endpoint: impl Into<String>) -> Self {
        ApiRequest::new(Method::PUT, endpoint)
    }

    /// Adds a header. On a name collision with the client's defaults the
    /// value given here is transmitted instead of the default.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a query parameter. Parameters are serialized in the order they
    /// are added; a parameter whose value is empty is omitted entirely.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Requests one page of a collection by setting the `Range` header to
    /// `items={start}-{end}`.
    pub fn range(self, window: PageWindow) -> Self {
        self.header("Range", window.header_value())
    }

    /// Attaches a request body. The caller supplies a matching
    /// `Content-Type` header when the endpoint requires one.
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

// ── Response ───────────────────────────────────────────────────────────

/// A normalized HTTP response.
///
/// The body is captured for every status code, including 4xx/5xx, so the
/// caller can always print or parse the server's payload alongside the
/// status.
#[derive(Debug)]
pub struct ApiResponse {
    pub(crate) status: StatusCode,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Bytes,
    pub(crate) deprecation_notice: Option<String>,
}

impl ApiResponse {
    /// The HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// `true` for the 2xx success family.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A single response header as UTF-8, if present and decodable.
    /// Header name matching is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// The raw response body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The response body as text, with invalid UTF-8 replaced.
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(ApiError::from)
    }

    /// The parsed `Content-Range` header, which reports the returned window
    /// and the collection total for paged endpoints.
    pub fn content_range(&self) -> Option<ContentRange> {
        self.header("Content-Range").and_then(ContentRange::parse)
    }

    /// The advisory deprecation notice, when the server flagged the
    /// requested API version for removal. Callers are expected to log it,
    /// not act on it.
    pub fn deprecation_notice(&self) -> Option<&str> {
        self.deprecation_notice.as_deref()
    }
}

// ── Client ─────────────────────────────────────────────────────────────

/// Authenticated HTTP client. Construct once from a [`ClientConfig`] and
/// reuse for any number of sequential calls.
#[derive(Debug)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    default_headers: HeaderMap,
}

impl ApiClient {
    /// Builds a client for `https://{server}/api/`.
    ///
    /// Fails with [`ApiError::Configuration`] when the configuration holds
    /// no credential, and with [`ApiError::TlsVerification`] when the trust
    /// anchor PEM cannot be parsed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = format!("https://{}{}", config.server, BASE_PATH);
        Self::build(config, base_url)
    }

    /// Builds a client against an explicit base URL instead of the
    /// `https://{server}/api/` convention. Used by tests to point at a
    /// local mock server, and by nonstandard deployments behind a reverse
    /// proxy.
    pub fn with_base_url(config: ClientConfig, base_url: &str) -> Result<Self> {
        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        Self::build(config, base_url)
    }

    fn build(config: ClientConfig, base_url: String) -> Result<Self> {
        let default_headers = default_header_template(&config)?;
        let http = build_http_client(&config)?;
        Ok(ApiClient {
            http,
            base_url,
            default_headers,
        })
    }

    /// Performs one HTTPS round trip and returns the normalized response.
    ///
    /// The endpoint is joined to the base URL after stripping one leading
    /// `/`; caller headers are merged over the defaults (caller wins);
    /// query parameters are percent-encoded and serialized in order,
    /// skipping empty values.
    ///
    /// Every HTTP status yields `Ok` — check [`ApiResponse::status`] before
    /// trusting the body. `Err` is reserved for transport faults, with
    /// certificate failures reported as [`ApiError::TlsVerification`].
    pub async fn call(&self, request: &ApiRequest) -> Result<ApiResponse> {
        let url = self.request_url(&request.endpoint, &request.query);
        debug!(method = %request.method, %url, "sending API request");

        let mut headers = self.default_headers.clone();
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|err| ApiError::Configuration(format!("invalid header name {name:?}: {err}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|err| ApiError::Configuration(format!("invalid value for header {name}: {err}")))?;
            // HeaderMap::insert replaces any default under the same name,
            // so a collision can never produce duplicate headers.
            headers.insert(name, value);
        }

        let mut builder = self.http.request(request.method.clone(), &url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify_send_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let deprecation_notice = headers
            .get(DEPRECATED_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        if let Some(notice) = &deprecation_notice {
            warn!(%url, "deprecated API version: {notice}");
        }

        // The body is read for error statuses too; the server's diagnostic
        // payload is the caller's only clue for 4xx/5xx handling.
        let body = response.bytes().await.map_err(ApiError::Transport)?;

        Ok(ApiResponse {
            status,
            headers,
            body,
            deprecation_notice,
        })
    }

    /// Sends a GET request to the endpoint with no extra headers or
    /// parameters.
    pub async fn get(&self, endpoint: &str) -> Result<ApiResponse> {
        self.call(&ApiRequest::get(endpoint)).await
    }

    /// Sends a POST request to the endpoint with no extra headers or
    /// parameters.
    pub async fn post(&self, endpoint: &str) -> Result<ApiResponse> {
        self.call(&ApiRequest::post(endpoint)).await
    }

    /// Sends a DELETE request to the endpoint with no extra headers or
    /// parameters.
    pub async fn delete(&self, endpoint: &str) -> Result<ApiResponse> {
        self.call(&ApiRequest::delete(endpoint)).await
    }

    fn request_url(&self, endpoint: &str, query: &[(String, String)]) -> String {
        // Accept endpoints with or without a leading slash.
        let endpoint = endpoint.strip_prefix('/').unwrap_or(endpoint);
        let query_string = encode_query(query);
        if query_string.is_empty() {
            format!("{}{}", self.base_url, endpoint)
        } else {
            format!("{}{}?{}", self.base_url, endpoint, query_string)
        }
    }
}

/// Builds the default header set: `Accept`, optional `Version`, and the
/// credential header chosen by the configured [`Credential`] variant.
fn default_header_template(config: &ClientConfig) -> Result<HeaderMap> {
    use base64::engine::general_purpose::STANDARD as BASE64;
    use base64::Engine as _;

    let mut headers = HeaderMap::new();

    let accept = HeaderValue::from_str(&config.accept)
        .map_err(|err| ApiError::Configuration(format!("invalid Accept value: {err}")))?;
    headers.insert(ACCEPT, accept);

    if let Some(version) = &config.api_version {
        let version = HeaderValue::from_str(version)
            .map_err(|err| ApiError::Configuration(format!("invalid Version value: {err}")))?;
        headers.insert(HeaderName::from_static("version"), version);
    }

    match &config.credential {
        Some(Credential::ApiToken(token)) => {
            let mut value = HeaderValue::from_str(token)
                .map_err(|err| ApiError::Configuration(format!("invalid auth token: {err}")))?;
            value.set_sensitive(true);
            headers.insert(HeaderName::from_static("sec"), value);
        }
        Some(Credential::Basic { username, password }) => {
            let encoded = BASE64.encode(format!("{username}:{password}"));
            let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
                .map_err(|err| ApiError::Configuration(format!("invalid basic credentials: {err}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        None => {
            return Err(ApiError::Configuration(
                "no valid credentials found in configuration".to_string(),
            ));
        }
    }

    Ok(headers)
}

/// Builds the underlying `reqwest::Client` with the configured TLS policy
/// and timeouts.
fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client> {
    let min_tls = if config.allow_weak_tls {
        reqwest::tls::Version::TLS_1_0
    } else {
        reqwest::tls::Version::TLS_1_2
    };

    let mut builder = reqwest::Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .min_tls_version(min_tls);

    if let Some(pem) = &config.trust_anchor {
        let cert = reqwest::Certificate::from_pem(pem).map_err(|err| ApiError::TlsVerification {
            message: format!("invalid trust anchor: {err}"),
        })?;
        // Only the supplied CA is trusted when an anchor is configured.
        builder = builder
            .tls_built_in_root_certs(false)
            .add_root_certificate(cert);
    }

    if config.skip_hostname_verification {
        builder = builder.danger_accept_invalid_hostnames(true);
    }

    builder
        .build()
        .map_err(|err| ApiError::Configuration(format!("failed to build HTTP client: {err}")))
}

/// Serializes query parameters in the supplied order, `&`-separated, with
/// percent-encoded values. Pairs with an empty value are dropped entirely.
fn encode_query(pairs: &[(String, String)]) -> String {
    let mut parts = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        if value.is_empty() {
            continue;
        }
        parts.push(format!("{key}={}", utf8_percent_encode(value, QUERY_VALUE_ENCODE)));
    }
    parts.join("&")
}

/// Splits send failures into the fatal certificate category and the
/// retryable transport category. reqwest does not expose TLS verification
/// failures as a distinct error kind, so the cause chain is inspected.
fn classify_send_error(err: reqwest::Error) -> ApiError {
    if chain_mentions_certificate(&err) {
        ApiError::TlsVerification {
            message: err.to_string(),
        }
    } else {
        ApiError::Transport(err)
    }
}

fn chain_mentions_certificate(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(cause) = current {
        if cause.to_string().to_ascii_lowercase().contains("certificate") {
            return true;
        }
        current = cause.source();
    }
    false
}
