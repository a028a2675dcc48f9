//! Handler configuration.

/// Configuration for the request handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Honor `X-Repository-Base` from callers.
    pub allow_base_override: bool,
    /// Reject requests without an `Authorization` header.
    pub require_auth: bool,
}

impl ServerConfig {
    /// Creates a configuration with overrides allowed and auth optional.
    pub fn new() -> Self {
        Self {
            allow_base_override: true,
            require_auth: false,
        }
    }

    /// Sets whether callers may override the repository root.
    pub fn with_base_override(mut self, allow: bool) -> Self {
        self.allow_base_override = allow;
        self
    }

    /// Requires an `Authorization` header on every request.
    pub fn with_required_auth(mut self) -> Self {
        self.require_auth = true;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_builder() {
        let config = ServerConfig::new()
            .with_base_override(false)
            .with_required_auth();
        assert!(!config.allow_base_override);
        assert!(config.require_auth);
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert!(config.allow_base_override);
        assert!(!config.require_auth);
    }
}
