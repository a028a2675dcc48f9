//! Optimistic-concurrency tokens.

use std::fmt;

/// An opaque token describing a repository resource's current state.
///
/// Taken from the `ETag` response header and sent back in `If-Match`.
/// Any successful write to the resource invalidates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcurrencyToken(String);

impl ConcurrencyToken {
    /// Wraps a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Builds a token from an `ETag` header value.
    ///
    /// Weak validators (`W/"..."`) are accepted; the repository compares the
    /// opaque part only. Returns `None` for an empty tag.
    pub fn from_etag(etag: &str) -> Option<Self> {
        let value = etag.trim();
        let value = value.strip_prefix("W/").unwrap_or(value);
        let value = value.trim_matches('"');
        if value.is_empty() {
            None
        } else {
            Some(Self(value.to_string()))
        }
    }

    /// The raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value formatted for an `If-Match` header.
    pub fn to_if_match(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for ConcurrencyToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
