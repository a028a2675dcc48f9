//! Content digests for binary comparison.

use crate::error::{ProtocolError, ProtocolResult};
use std::fmt;
use std::str::FromStr;

/// Hash algorithm of a [`ContentDigest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// MD5.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256.
    Sha256,
    /// SHA-512.
    Sha512,
}

impl DigestAlgorithm {
    /// The RFC 3230 token (`sha-256`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "md5",
            DigestAlgorithm::Sha1 => "sha",
            DigestAlgorithm::Sha256 => "sha-256",
            DigestAlgorithm::Sha512 => "sha-512",
        }
    }
}

impl FromStr for DigestAlgorithm {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(DigestAlgorithm::Md5),
            "sha" | "sha1" | "sha-1" => Ok(DigestAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(DigestAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(DigestAlgorithm::Sha512),
            other => Err(ProtocolError::InvalidDigest {
                value: other.to_string(),
            }),
        }
    }
}

/// A strong hash of binary content.
///
/// Two digests are equal only when both algorithm and value match, so a
/// SHA-1 from one side never "matches" a SHA-256 from the other.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentDigest {
    /// Hash algorithm.
    pub algorithm: DigestAlgorithm,
    /// Digest value; hex values are lowercased.
    pub value: String,
}

impl ContentDigest {
    /// Creates a digest, normalizing hex values to lowercase.
    pub fn new(algorithm: DigestAlgorithm, value: impl Into<String>) -> Self {
        let value = value.into();
        let value = if value.chars().all(|c| c.is_ascii_hexdigit()) {
            value.to_ascii_lowercase()
        } else {
            value
        };
        Self { algorithm, value }
    }

    /// Shorthand for a SHA-256 digest.
    pub fn sha256(value: impl Into<String>) -> Self {
        Self::new(DigestAlgorithm::Sha256, value)
    }

    /// Parses one `algorithm=value` entry of an RFC 3230 `Digest` header.
    pub fn parse_header_entry(entry: &str) -> ProtocolResult<Self> {
        let (algorithm, value) = entry.trim().split_once('=').ok_or_else(|| {
            ProtocolError::InvalidDigest {
                value: entry.to_string(),
            }
        })?;
        let value = value.trim();
        if value.is_empty() {
            return Err(ProtocolError::InvalidDigest {
                value: entry.to_string(),
            });
        }
        Ok(Self::new(algorithm.parse()?, value))
    }

    /// Parses a full `Digest` header, preferring the strongest algorithm present.
    pub fn parse_header(header: &str) -> ProtocolResult<Self> {
        let mut best: Option<Self> = None;
        for entry in header.split(',').filter(|e| !e.trim().is_empty()) {
            let digest = Self::parse_header_entry(entry)?;
            let stronger = best
                .as_ref()
                .map_or(true, |b| rank(digest.algorithm) > rank(b.algorithm));
            if stronger {
                best = Some(digest);
            }
        }
        best.ok_or_else(|| ProtocolError::InvalidDigest {
            value: header.to_string(),
        })
    }

    /// Formats the digest as a `Digest` header value.
    pub fn to_header(&self) -> String {
        format!("{}={}", self.algorithm.as_str(), self.value)
    }
}

fn rank(algorithm: DigestAlgorithm) -> u8 {
    match algorithm {
        DigestAlgorithm::Md5 => 0,
        DigestAlgorithm::Sha1 => 1,
        DigestAlgorithm::Sha256 => 2,
        DigestAlgorithm::Sha512 => 3,
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "urn:{}:{}", self.algorithm.as_str(), self.value)
    }
}
