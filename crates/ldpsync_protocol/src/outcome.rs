//! Classified results of upstream calls and synchronization runs.

use serde::Serialize;
use std::fmt;

/// Which upstream system produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpstreamSource {
    /// The content-management system.
    Cms,
    /// The object repository.
    Repository,
}

impl fmt::Display for UpstreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamSource::Cms => f.write_str("cms"),
            UpstreamSource::Repository => f.write_str("repository"),
        }
    }
}

/// Tagged result of one upstream call.
///
/// Every collaborator returns one of these instead of raising, so the engine
/// can branch on `NotFound` or `Conflict` by pattern matching. Statuses and
/// messages are kept exactly as received.
#[derive(Debug, Clone, PartialEq)]
pub enum Upstream<T> {
    /// The call succeeded.
    Ok(T),
    /// The resource is absent (404) or gone (410).
    NotFound {
        /// Original status.
        status: u16,
        /// Original response body.
        message: String,
    },
    /// A precondition failed or the write collided with another writer.
    Conflict {
        /// Original status.
        status: u16,
        /// Original response body.
        message: String,
    },
    /// Any other failure, including transport failures mapped to 502/504.
    Failed {
        /// Original (or gateway) status.
        status: u16,
        /// Original response body or transport error text.
        message: String,
    },
}

/// The non-`Ok` half of an [`Upstream`], detached from its value type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamFault {
    /// What kind of failure.
    pub kind: FaultKind,
    /// Original status.
    pub status: u16,
    /// Original message.
    pub message: String,
}

/// Failure classes carried by [`UpstreamFault`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// See [`Upstream::NotFound`].
    NotFound,
    /// See [`Upstream::Conflict`].
    Conflict,
    /// See [`Upstream::Failed`].
    Failed,
}

impl<T> Upstream<T> {
    /// Returns true for `Ok`.
    pub fn is_ok(&self) -> bool {
        matches!(self, Upstream::Ok(_))
    }

    /// Original status of a non-`Ok` result.
    pub fn status(&self) -> Option<u16> {
        match self {
            Upstream::Ok(_) => None,
            Upstream::NotFound { status, .. }
            | Upstream::Conflict { status, .. }
            | Upstream::Failed { status, .. } => Some(*status),
        }
    }

    /// Maps the success value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Upstream<U> {
        match self {
            Upstream::Ok(value) => Upstream::Ok(f(value)),
            Upstream::NotFound { status, message } => Upstream::NotFound { status, message },
            Upstream::Conflict { status, message } => Upstream::Conflict { status, message },
            Upstream::Failed { status, message } => Upstream::Failed { status, message },
        }
    }

    /// Splits into the value or a type-erased fault.
    pub fn into_result(self) -> Result<T, UpstreamFault> {
        let (kind, status, message) = match self {
            Upstream::Ok(value) => return Ok(value),
            Upstream::NotFound { status, message } => (FaultKind::NotFound, status, message),
            Upstream::Conflict { status, message } => (FaultKind::Conflict, status, message),
            Upstream::Failed { status, message } => (FaultKind::Failed, status, message),
        };
        Err(UpstreamFault {
            kind,
            status,
            message,
        })
    }
}

impl<T> From<UpstreamFault> for Upstream<T> {
    fn from(fault: UpstreamFault) -> Self {
        let UpstreamFault {
            kind,
            status,
            message,
        } = fault;
        match kind {
            FaultKind::NotFound => Upstream::NotFound { status, message },
            FaultKind::Conflict => Upstream::Conflict { status, message },
            FaultKind::Failed => Upstream::Failed { status, message },
        }
    }
}

/// Why a write was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictReason {
    /// The repository already holds state at least as new as the CMS.
    Stale,
    /// The concurrency token no longer matched at write time.
    TokenMismatch,
    /// A creation raced another writer that created the resource first.
    AlreadyExists,
}

/// Final status of one synchronization request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case", tag = "status", content = "reason")]
pub enum SyncStatus {
    /// A new repository resource was created.
    Created,
    /// An existing resource was updated.
    Updated,
    /// Nothing had changed; no write was issued.
    Unchanged,
    /// The resource was deleted.
    Deleted,
    /// A version snapshot was created.
    Versioned,
    /// The write was refused.
    Conflict(ConflictReason),
    /// No such resource (or no mapping for the identifier).
    NotFound,
    /// The resource existed once and has been deleted.
    Gone,
    /// An upstream system failed; see `source` and `upstream_status`.
    UpstreamError,
}

impl SyncStatus {
    /// Returns true for statuses where the request achieved its goal.
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            SyncStatus::Created
                | SyncStatus::Updated
                | SyncStatus::Unchanged
                | SyncStatus::Deleted
                | SyncStatus::Versioned
        )
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Created => f.write_str("created"),
            SyncStatus::Updated => f.write_str("updated"),
            SyncStatus::Unchanged => f.write_str("unchanged"),
            SyncStatus::Deleted => f.write_str("deleted"),
            SyncStatus::Versioned => f.write_str("versioned"),
            SyncStatus::Conflict(ConflictReason::Stale) => f.write_str("conflict (stale)"),
            SyncStatus::Conflict(ConflictReason::TokenMismatch) => {
                f.write_str("conflict (token mismatch)")
            }
            SyncStatus::Conflict(ConflictReason::AlreadyExists) => {
                f.write_str("conflict (already exists)")
            }
            SyncStatus::NotFound => f.write_str("not found"),
            SyncStatus::Gone => f.write_str("gone"),
            SyncStatus::UpstreamError => f.write_str("upstream error"),
        }
    }
}

/// What one synchronization request achieved.
///
/// Constructed fresh per call and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Final status.
    pub status: SyncStatus,
    /// Resulting repository location (set for creations and versions).
    pub location: Option<String>,
    /// Status code of the upstream response that decided the outcome.
    pub upstream_status: Option<u16>,
    /// Which upstream produced that response.
    pub source: Option<UpstreamSource>,
    /// Upstream body or an explanatory message, forwarded unchanged.
    pub body: String,
}

impl SyncOutcome {
    /// Creates an outcome with only a status.
    pub fn new(status: SyncStatus) -> Self {
        Self {
            status,
            location: None,
            upstream_status: None,
            source: None,
            body: String::new(),
        }
    }

    /// Builds the outcome for a failed upstream call.
    pub fn from_fault(source: UpstreamSource, fault: UpstreamFault) -> Self {
        let status = match (fault.kind, fault.status) {
            (FaultKind::NotFound, 410) => SyncStatus::Gone,
            (FaultKind::NotFound, _) => SyncStatus::NotFound,
            (FaultKind::Conflict, _) => SyncStatus::Conflict(ConflictReason::TokenMismatch),
            (FaultKind::Failed, _) => SyncStatus::UpstreamError,
        };
        Self {
            status,
            location: None,
            upstream_status: Some(fault.status),
            source: Some(source),
            body: fault.message,
        }
    }

    /// Sets the resulting location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Records the deciding upstream status.
    pub fn with_upstream(mut self, source: UpstreamSource, status: u16) -> Self {
        self.source = Some(source);
        self.upstream_status = Some(status);
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// The HTTP status a caller-facing interface should answer with.
    pub fn http_status(&self) -> u16 {
        match self.status {
            SyncStatus::Created | SyncStatus::Versioned => 201,
            SyncStatus::Updated | SyncStatus::Deleted => 204,
            SyncStatus::Unchanged => 200,
            SyncStatus::Conflict(_) => self.upstream_status.unwrap_or(412),
            SyncStatus::NotFound => self.upstream_status.unwrap_or(404),
            SyncStatus::Gone => 410,
            SyncStatus::UpstreamError => self.upstream_status.unwrap_or(502),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_result_keeps_status_and_message() {
        let upstream: Upstream<()> = Upstream::Failed {
            status: 503,
            message: "down".into(),
        };
        let fault = upstream.into_result().unwrap_err();
        assert_eq!(fault.kind, FaultKind::Failed);
        assert_eq!(fault.status, 503);
        assert_eq!(fault.message, "down");
    }

    #[test]
    fn fault_roundtrip() {
        let upstream: Upstream<u8> = Upstream::Conflict {
            status: 412,
            message: "etag".into(),
        };
        let back: Upstream<u8> = upstream.clone().into_result().unwrap_err().into();
        assert_eq!(back, upstream);
    }

    #[test]
    fn gone_is_distinct_from_not_found() {
        let gone = SyncOutcome::from_fault(
            UpstreamSource::Repository,
            Upstream::<()>::NotFound {
                status: 410,
                message: String::new(),
            }
            .into_result()
            .unwrap_err(),
        );
        assert_eq!(gone.status, SyncStatus::Gone);

        let missing = SyncOutcome::from_fault(
            UpstreamSource::Repository,
            Upstream::<()>::NotFound {
                status: 404,
                message: String::new(),
            }
            .into_result()
            .unwrap_err(),
        );
        assert_eq!(missing.status, SyncStatus::NotFound);
        assert_eq!(missing.http_status(), 404);
    }

    #[test]
    fn http_status_preserves_upstream() {
        let outcome = SyncOutcome::new(SyncStatus::UpstreamError)
            .with_upstream(UpstreamSource::Cms, 403);
        assert_eq!(outcome.http_status(), 403);

        let stale = SyncOutcome::new(SyncStatus::Conflict(ConflictReason::Stale));
        assert_eq!(stale.http_status(), 412);
    }

    #[test]
    fn success_statuses() {
        assert!(SyncStatus::Unchanged.is_success());
        assert!(!SyncStatus::Gone.is_success());
        assert!(!SyncStatus::Conflict(ConflictReason::Stale).is_success());
    }
}
