//! HTTP client abstraction.
//!
//! Both upstream clients talk HTTP through the [`HttpClient`] trait, so the
//! synchronizer can run against reqwest, an in-memory fake, or the scripted
//! [`MockHttpClient`].

use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Header names used across the synchronizer.
pub mod header {
    /// `Accept`.
    pub const ACCEPT: &str = "Accept";
    /// `Authorization`.
    pub const AUTHORIZATION: &str = "Authorization";
    /// `Content-Location`.
    pub const CONTENT_LOCATION: &str = "Content-Location";
    /// `Content-Type`.
    pub const CONTENT_TYPE: &str = "Content-Type";
    /// `Content-Length`.
    pub const CONTENT_LENGTH: &str = "Content-Length";
    /// `Digest` (RFC 3230).
    pub const DIGEST: &str = "Digest";
    /// `ETag`.
    pub const ETAG: &str = "ETag";
    /// `If-Match`.
    pub const IF_MATCH: &str = "If-Match";
    /// `If-None-Match`.
    pub const IF_NONE_MATCH: &str = "If-None-Match";
    /// `Link`.
    pub const LINK: &str = "Link";
    /// `Location`.
    pub const LOCATION: &str = "Location";
    /// `Prefer` (RFC 7240).
    pub const PREFER: &str = "Prefer";
    /// `Want-Digest` (RFC 3230).
    pub const WANT_DIGEST: &str = "Want-Digest";
}

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET.
    Get,
    /// HEAD.
    Head,
    /// PUT.
    Put,
    /// POST.
    Post,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

impl Method {
    /// Upper-case method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    /// Method.
    pub method: Method,
    /// Absolute URL.
    pub url: String,
    /// Headers in insertion order. Names compare case-insensitively.
    pub headers: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Creates a request with no headers or body.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Adds a header when a value is present.
    pub fn header_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.header(name, value),
            None => self,
        }
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// First value of a header.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// A received response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Headers in received order.
    pub headers: Vec<(String, String)>,
    /// Body; empty for HEAD.
    pub body: Bytes,
}

impl HttpResponse {
    /// Creates an empty response with the given status.
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Bytes::new(),
        }
    }

    /// Adds a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// First value of a header.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Every value of a header, e.g. repeated `Link` headers.
    pub fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.headers
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Failure below the HTTP layer: nothing usable came back.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// Any other transport failure.
    #[error("transport failure: {0}")]
    Other(String),
}

impl TransportError {
    /// The gateway status reported to callers for this failure.
    pub fn gateway_status(&self) -> u16 {
        match self {
            TransportError::Timeout(_) => 504,
            TransportError::Connect(_) | TransportError::Other(_) => 502,
        }
    }
}

/// HTTP client abstraction.
///
/// Implementations must enforce their own timeout and report it as
/// [`TransportError::Timeout`]. Non-2xx statuses are *responses*, not errors.
pub trait HttpClient: Send + Sync {
    /// Executes one request.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Box<T> {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

type Scripted = Result<HttpResponse, TransportError>;

/// A scripted HTTP client for testing.
///
/// Responses are queued per `(method, url)` and consumed in order; the last
/// queued response for a route is repeated once the queue runs dry. Every
/// request is recorded for later assertions.
#[derive(Debug, Default)]
pub struct MockHttpClient {
    routes: Mutex<HashMap<(Method, String), VecDeque<Scripted>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    /// Creates a client with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response for a route.
    pub fn respond(&self, method: Method, url: &str, response: HttpResponse) {
        self.routes
            .lock()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(Ok(response));
    }

    /// Queues a transport failure for a route.
    pub fn fail(&self, method: Method, url: &str, error: TransportError) {
        self.routes
            .lock()
            .entry((method, url.to_string()))
            .or_default()
            .push_back(Err(error));
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Requests with the given method.
    pub fn requests_with(&self, method: Method) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .iter()
            .filter(|r| r.method == method)
            .cloned()
            .collect()
    }
}

impl HttpClient for MockHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let key = (request.method, request.url.clone());
        self.requests.lock().push(request);

        let mut routes = self.routes.lock();
        let queue = routes.get_mut(&key).ok_or_else(|| {
            TransportError::Other(format!("no mock response for {} {}", key.0, key.1))
        })?;
        if queue.len() > 1 {
            queue
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Other("empty mock queue".into())))
        } else {
            queue
                .front()
                .cloned()
                .unwrap_or_else(|| Err(TransportError::Other("empty mock queue".into())))
        }
    }
}
