//! Configuration for the sync engine.

use ldpsync_graph::{vocab, TransformOptions};
use ldpsync_resolver::ResolverConfig;
use std::time::Duration;

/// Default repository root.
pub const DEFAULT_REPOSITORY_BASE: &str = "http://localhost:8080/rest";

/// Configuration for sync operations.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    /// Repository root used when a request does not name one.
    pub repository_base: String,
    /// Predicate carrying the modified marker on both sides.
    pub modified_predicate: String,
    /// Strip the CMS `_format` query parameter from subjects.
    pub strip_jsonld_suffix: bool,
    /// Use the pre-Memento `fcr:versions` endpoint for versioning.
    pub is_legacy_repository: bool,
    /// Predicates never written to the repository.
    pub exclude_predicates: Vec<String>,
    /// Request timeout for the concrete HTTP client.
    pub timeout: Duration,
    /// Path resolution strategy.
    pub resolver: ResolverConfig,
}

impl SyncConfig {
    /// Creates a configuration for a repository root.
    pub fn new(repository_base: impl Into<String>) -> Self {
        Self {
            repository_base: repository_base.into(),
            modified_predicate: vocab::SCHEMA_DATE_MODIFIED.to_string(),
            strip_jsonld_suffix: true,
            is_legacy_repository: false,
            exclude_predicates: vocab::REPOSITORY_MANAGED
                .iter()
                .map(|p| p.to_string())
                .collect(),
            timeout: Duration::from_secs(30),
            resolver: ResolverConfig::default(),
        }
    }

    /// Sets the modified-marker predicate.
    pub fn with_modified_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.modified_predicate = predicate.into();
        self
    }

    /// Enables or disables `_format` stripping.
    pub fn with_strip_jsonld_suffix(mut self, strip: bool) -> Self {
        self.strip_jsonld_suffix = strip;
        self
    }

    /// Marks the repository as a legacy (pre-Memento) one.
    pub fn with_legacy_repository(mut self, legacy: bool) -> Self {
        self.is_legacy_repository = legacy;
        self
    }

    /// Replaces the excluded predicates.
    pub fn with_exclude_predicates(mut self, predicates: Vec<String>) -> Self {
        self.exclude_predicates = predicates;
        self
    }

    /// Adds one excluded predicate.
    pub fn with_excluded_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.exclude_predicates.push(predicate.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the resolver strategy.
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Options for the metadata transformer derived from this configuration.
    pub fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            exclude_predicates: self.exclude_predicates.clone(),
            strip_jsonld_suffix: self.strip_jsonld_suffix,
            modified_predicate: self.modified_predicate.clone(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_REPOSITORY_BASE)
    }
}
