//! Modified markers used for staleness detection.

use crate::error::{ProtocolError, ProtocolResult};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;

/// The last-modified timestamp recorded in an entity's metadata graph.
///
/// The CMS stamps it on every edit and the synchronizer writes it through
/// to the repository, so comparing the two tells whether a write is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModifiedMarker(DateTime<Utc>);

impl ModifiedMarker {
    /// Wraps a UTC timestamp.
    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// Parses an `xsd:dateTime` literal.
    ///
    /// RFC 3339 values are converted to UTC. Values without an offset are
    /// taken to be UTC already.
    pub fn parse(literal: &str) -> ProtocolResult<Self> {
        let literal = literal.trim();
        if let Ok(at) = DateTime::parse_from_rfc3339(literal) {
            return Ok(Self(at.with_timezone(&Utc)));
        }
        NaiveDateTime::parse_from_str(literal, "%Y-%m-%dT%H:%M:%S%.f")
            .map(|naive| Self(naive.and_utc()))
            .map_err(|_| ProtocolError::InvalidTimestamp {
                value: literal.to_string(),
            })
    }

    /// Builds a marker from Unix seconds. Out-of-range values clamp to the epoch.
    pub fn from_unix(seconds: i64) -> Self {
        Self(DateTime::from_timestamp(seconds, 0).unwrap_or_default())
    }

    /// The underlying timestamp.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.0
    }

    /// Formats the marker as an `xsd:dateTime` literal.
    pub fn to_literal(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl fmt::Display for ModifiedMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_literal())
    }
}
