//! Caller credentials forwarded upstream.

use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The caller's `Authorization` header value.
///
/// Forwarded verbatim to both the CMS and the repository; this crate never
/// inspects or verifies it. The value is wiped from memory on drop and
/// redacted in debug output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a full header value, e.g. `Bearer abc`.
    pub fn new(header_value: impl Into<String>) -> Self {
        Self(header_value.into())
    }

    /// Builds a bearer credential from a raw token.
    pub fn bearer(token: &str) -> Self {
        Self(format!("Bearer {}", token))
    }

    /// The header value to forward.
    pub fn header_value(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}
