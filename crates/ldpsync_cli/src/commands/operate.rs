//! Save, delete and version commands.

use crate::config::ConfigFile;
use crate::error::CliResult;
use crate::http::ReqwestHttpClient;
use ldpsync_engine::SyncEngine;
use ldpsync_protocol::{header, AuthToken};
use ldpsync_resolver::build_resolver;
use ldpsync_server::{
    HandlerResponse, InboundRequest, RequestHandler, ServerConfig, REPOSITORY_BASE_HEADER,
};
use serde::Serialize;

/// What gets printed for one request.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    /// HTTP-equivalent status.
    pub status: u16,
    /// Resulting repository location, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a str>,
    /// Upstream body or message.
    pub body: &'a str,
}

impl<'a> Report<'a> {
    fn new(response: &'a HandlerResponse) -> Self {
        Self {
            status: response.status,
            location: response.header(header::LOCATION),
            body: &response.body,
        }
    }
}

/// Adds the per-invocation repository root and credentials.
pub fn with_upstream(
    mut request: InboundRequest,
    base: Option<&str>,
    token: Option<&str>,
) -> InboundRequest {
    if let Some(base) = base {
        request = request.with_header(REPOSITORY_BASE_HEADER, base);
    }
    if let Some(token) = token {
        request = request.with_header(
            header::AUTHORIZATION,
            AuthToken::bearer(token).header_value(),
        );
    }
    request
}

/// Runs one request and prints the result. Returns whether it succeeded.
pub fn run(config: &ConfigFile, request: &InboundRequest, format: &str) -> CliResult<bool> {
    let sync = config.to_sync_config();
    let http = ReqwestHttpClient::new(sync.timeout)?;
    let resolver = build_resolver(&sync.resolver)?;
    let handler = RequestHandler::new(SyncEngine::new(sync, resolver, http), ServerConfig::new());

    let response = handler.handle(request);
    print(&Report::new(&response), format)?;
    Ok(response.is_success())
}

fn print(report: &Report<'_>, format: &str) -> CliResult<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }
    println!("status: {}", report.status);
    if let Some(location) = report.location {
        println!("location: {}", location);
    }
    if !report.body.is_empty() {
        println!("{}", report.body);
    }
    Ok(())
}
