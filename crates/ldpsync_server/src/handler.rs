//! Request handling for the save, delete and version operations.

use crate::config::ServerConfig;
use crate::error::{HandlerError, HandlerResult};
use ldpsync_engine::{DeleteRequest, SaveRequest, SyncEngine, SyncError, VersionRequest};
use ldpsync_protocol::{header, AuthToken, EntityKind, EntityRef, HttpClient, SyncOutcome, SyncStatus};
use ldpsync_resolver::PathResolver;
use std::fmt;
use tracing::{debug, warn};

/// Header naming the repository root for a single request.
pub const REPOSITORY_BASE_HEADER: &str = "X-Repository-Base";

/// The operation a caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Push the entity's current CMS state to the repository.
    Save,
    /// Remove the entity's repository resource.
    Delete,
    /// Snapshot the entity's repository resource.
    Version,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Save => f.write_str("save"),
            Operation::Delete => f.write_str("delete"),
            Operation::Version => f.write_str("version"),
        }
    }
}

/// A caller request, independent of any HTTP framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundRequest {
    /// Requested operation.
    pub operation: Operation,
    /// CMS identifier of the entity.
    pub identifier: String,
    /// Entity kind as sent by the caller; saves default to `node`.
    pub kind: Option<String>,
    /// Request headers in arrival order.
    pub headers: Vec<(String, String)>,
}

impl InboundRequest {
    /// Creates a request without headers.
    pub fn new(operation: Operation, identifier: impl Into<String>) -> Self {
        Self {
            operation,
            identifier: identifier.into(),
            kind: None,
            headers: Vec::new(),
        }
    }

    /// Sets the entity kind.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First non-empty value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// What the caller gets back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: String,
}

impl HandlerResponse {
    fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let mut headers = Vec::new();
        if !body.is_empty() {
            headers.push((
                header::CONTENT_TYPE.to_string(),
                "text/plain; charset=utf-8".to_string(),
            ));
        }
        Self {
            status,
            headers,
            body,
        }
    }

    /// Looks up a response header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns true for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn from_outcome(outcome: SyncOutcome) -> Self {
        let status = outcome.http_status();
        let mut response = Self::new(status, outcome.body);
        if matches!(outcome.status, SyncStatus::Created | SyncStatus::Versioned) {
            if let Some(location) = outcome.location {
                response
                    .headers
                    .push((header::LOCATION.to_string(), location));
            }
        }
        response
    }

    fn from_error(error: &HandlerError) -> Self {
        Self::new(error.status_code(), error.to_string())
    }
}

/// Validates caller input, runs the engine and shapes the answer.
pub struct RequestHandler<R: PathResolver, H: HttpClient> {
    engine: SyncEngine<R, H>,
    config: ServerConfig,
}

impl<R: PathResolver, H: HttpClient> RequestHandler<R, H> {
    /// Creates a handler around an engine.
    pub fn new(engine: SyncEngine<R, H>, config: ServerConfig) -> Self {
        Self { engine, config }
    }

    /// Returns the handler configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the wrapped engine.
    pub fn engine(&self) -> &SyncEngine<R, H> {
        &self.engine
    }

    /// Handles one request. Every failure becomes a response.
    pub fn handle(&self, request: &InboundRequest) -> HandlerResponse {
        match self.dispatch(request) {
            Ok(outcome) => {
                debug!(
                    operation = %request.operation,
                    identifier = %request.identifier,
                    status = %outcome.status,
                    "request handled"
                );
                HandlerResponse::from_outcome(outcome)
            }
            Err(e) => {
                warn!(
                    operation = %request.operation,
                    identifier = %request.identifier,
                    error = %e,
                    "request rejected"
                );
                HandlerResponse::from_error(&e)
            }
        }
    }

    /// Runs a request and returns the engine outcome.
    pub fn dispatch(&self, request: &InboundRequest) -> HandlerResult<SyncOutcome> {
        let identifier = request.identifier.trim();
        if identifier.is_empty() {
            return Err(HandlerError::MissingIdentifier);
        }
        let auth = request.header(header::AUTHORIZATION).map(AuthToken::new);
        if self.config.require_auth && auth.is_none() {
            return Err(HandlerError::Unauthorized);
        }
        let base = if self.config.allow_base_override {
            request.header(REPOSITORY_BASE_HEADER)
        } else {
            None
        };

        let outcome = match request.operation {
            Operation::Save => {
                let kind = match request.kind.as_deref() {
                    Some(kind) => kind.parse::<EntityKind>().map_err(SyncError::from)?,
                    None => EntityKind::Node,
                };
                let locator = request
                    .header(header::CONTENT_LOCATION)
                    .ok_or(HandlerError::MissingHeader(header::CONTENT_LOCATION))?;
                let mut save = SaveRequest::new(EntityRef::new(identifier, kind), locator);
                if let Some(base) = base {
                    save = save.with_repository_base(base);
                }
                if let Some(auth) = auth {
                    save = save.with_auth(auth);
                }
                self.engine.save(&save)?
            }
            Operation::Delete => {
                let mut delete = DeleteRequest::new(identifier);
                if let Some(base) = base {
                    delete = delete.with_repository_base(base);
                }
                if let Some(auth) = auth {
                    delete = delete.with_auth(auth);
                }
                self.engine.delete(&delete)?
            }
            Operation::Version => {
                let mut version = VersionRequest::new(identifier);
                if let Some(base) = base {
                    version = version.with_repository_base(base);
                }
                if let Some(auth) = auth {
                    version = version.with_auth(auth);
                }
                self.engine.create_version(&version)?
            }
        };
        Ok(outcome)
    }
}
