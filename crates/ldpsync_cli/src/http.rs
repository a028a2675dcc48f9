//! `HttpClient` over blocking reqwest.

use crate::error::CliResult;
use ldpsync_protocol::{HttpClient, HttpRequest, HttpResponse, Method, TransportError};
use std::time::Duration;
use tracing::trace;

/// Blocking HTTP client with a per-request timeout.
pub struct ReqwestHttpClient {
    client: reqwest::blocking::Client,
}

impl ReqwestHttpClient {
    /// Builds a client that gives up after `timeout`.
    pub fn new(timeout: Duration) -> CliResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ldpsync/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

fn method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Put => reqwest::Method::PUT,
        Method::Post => reqwest::Method::POST,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

fn transport_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Other(error.to_string())
    }
}

impl ReqwestHttpClient {
    fn build(&self, request: HttpRequest) -> Result<reqwest::blocking::Request, TransportError> {
        let mut builder = self.client.request(method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body.to_vec());
        }
        builder.build().map_err(transport_error)
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        trace!(method = %request.method, url = %request.url, "sending");
        let request = self.build(request)?;
        let response = self.client.execute(request).map_err(transport_error)?;
        let mut out = HttpResponse::new(response.status().as_u16());
        for (name, value) in response.headers() {
            // Non-ASCII header values are not meaningful to either upstream.
            if let Ok(value) = value.to_str() {
                out = out.with_header(name.as_str(), value);
            }
        }
        let body = response.bytes().map_err(transport_error)?;
        Ok(out.with_body(body))
    }
}
