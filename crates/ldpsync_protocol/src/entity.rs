//! Entity references.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What kind of CMS entity is being synchronized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    /// A metadata-only content node.
    Node,
    /// A media entity with a binary file held by the repository.
    Media,
    /// A file that the repository references by URL instead of storing.
    ExternalFile,
}

impl EntityKind {
    /// Returns true if the repository resource is a binary with a separate description.
    pub fn is_binary(&self) -> bool {
        matches!(self, EntityKind::Media | EntityKind::ExternalFile)
    }

    /// Canonical name, as used on the command line and in config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Node => "node",
            EntityKind::Media => "media",
            EntityKind::ExternalFile => "external-file",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "node" => Ok(EntityKind::Node),
            "media" => Ok(EntityKind::Media),
            "external-file" | "external_file" | "external" => Ok(EntityKind::ExternalFile),
            other => Err(ProtocolError::UnknownKind(other.to_string())),
        }
    }
}

/// A stable reference to a CMS entity.
///
/// The identifier is minted by the CMS and never changed by the synchronizer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Opaque, globally unique identifier (a UUID in practice).
    pub identifier: String,
    /// Entity kind.
    pub kind: EntityKind,
}

impl EntityRef {
    /// Creates a new entity reference.
    pub fn new(identifier: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            identifier: identifier.into(),
            kind,
        }
    }

    /// Shorthand for a node reference.
    pub fn node(identifier: impl Into<String>) -> Self {
        Self::new(identifier, EntityKind::Node)
    }

    /// Shorthand for a media reference.
    pub fn media(identifier: impl Into<String>) -> Self {
        Self::new(identifier, EntityKind::Media)
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.identifier)
    }
}
