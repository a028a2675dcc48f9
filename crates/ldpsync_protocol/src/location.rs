//! Repository resource locations.

use crate::error::{ProtocolError, ProtocolResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a resource lives in the repository.
///
/// A location is assigned once per identifier and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceLocation {
    /// Repository root, e.g. `http://localhost:8080/rest`.
    pub base: String,
    /// Path below the root, without a leading slash.
    pub path: String,
}

impl ResourceLocation {
    /// Creates a location, normalizing slashes at the join point.
    pub fn new(base: impl Into<String>, path: impl Into<String>) -> Self {
        let base = base.into();
        let path = path.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
            path: path.trim_start_matches('/').to_string(),
        }
    }

    /// Splits an absolute URI that lives under `base`.
    ///
    /// Used for link targets such as a binary's `describedby` description.
    pub fn from_uri(base: &str, uri: &str) -> ProtocolResult<Self> {
        let trimmed = base.trim_end_matches('/');
        match uri.strip_prefix(trimmed) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                Ok(Self::new(trimmed, rest))
            }
            _ => Err(ProtocolError::ForeignUri {
                uri: uri.to_string(),
                base: base.to_string(),
            }),
        }
    }

    /// The absolute URI of the resource.
    pub fn uri(&self) -> String {
        if self.path.is_empty() {
            self.base.clone()
        } else {
            format!("{}/{}", self.base, self.path)
        }
    }

    /// A child location below this one.
    pub fn child(&self, segment: &str) -> Self {
        let segment = segment.trim_start_matches('/');
        if self.path.is_empty() {
            Self::new(self.base.clone(), segment)
        } else {
            Self::new(self.base.clone(), format!("{}/{}", self.path, segment))
        }
    }
}

impl fmt::Display for ResourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uri_joins_with_single_slash() {
        let loc = ResourceLocation::new("http://repo/rest/", "/ab/cd");
        assert_eq!(loc.uri(), "http://repo/rest/ab/cd");
    }

    #[test]
    fn from_uri_splits_under_base() {
        let loc = ResourceLocation::from_uri("http://repo/rest", "http://repo/rest/ab/cd/fcr:metadata")
            .unwrap();
        assert_eq!(loc.base, "http://repo/rest");
        assert_eq!(loc.path, "ab/cd/fcr:metadata");
    }

    #[test]
    fn from_uri_rejects_foreign() {
        assert!(ResourceLocation::from_uri("http://repo/rest", "http://other/x").is_err());
        // Prefix match without a path boundary is foreign too.
        assert!(ResourceLocation::from_uri("http://repo/rest", "http://repo/restore/x").is_err());
    }

    #[test]
    fn child_location() {
        let loc = ResourceLocation::new("http://repo/rest", "ab/cd");
        assert_eq!(loc.child("fcr:versions").uri(), "http://repo/rest/ab/cd/fcr:versions");
    }
}
