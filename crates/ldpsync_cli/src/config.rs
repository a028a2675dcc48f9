//! TOML configuration file.

use crate::error::{CliError, CliResult};
use ldpsync_engine::{SyncConfig, DEFAULT_REPOSITORY_BASE};
use ldpsync_resolver::ResolverConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Settings read from `--config`. Absent keys take the engine defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Repository root used when no `--base` is given.
    pub repository_base: String,
    /// Predicate carrying the modified marker.
    pub modified_predicate: String,
    /// Strip the CMS `_format` parameter from subjects.
    pub strip_jsonld_suffix: bool,
    /// Target a pre-Memento repository.
    pub legacy_repository: bool,
    /// Predicates never written; replaces the built-in list when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude_predicates: Option<Vec<String>>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Path resolution strategy.
    pub resolver: ResolverConfig,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = SyncConfig::new(DEFAULT_REPOSITORY_BASE);
        Self {
            repository_base: defaults.repository_base,
            modified_predicate: defaults.modified_predicate,
            strip_jsonld_suffix: defaults.strip_jsonld_suffix,
            legacy_repository: defaults.is_legacy_repository,
            exclude_predicates: None,
            timeout_secs: defaults.timeout.as_secs(),
            resolver: defaults.resolver,
        }
    }
}

impl ConfigFile {
    /// Loads the file at `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> CliResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|source| CliError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Builds the engine configuration.
    pub fn to_sync_config(&self) -> SyncConfig {
        let mut config = SyncConfig::new(&self.repository_base)
            .with_modified_predicate(&self.modified_predicate)
            .with_strip_jsonld_suffix(self.strip_jsonld_suffix)
            .with_legacy_repository(self.legacy_repository)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_resolver(self.resolver.clone());
        if let Some(predicates) = &self.exclude_predicates {
            config = config.with_exclude_predicates(predicates.clone());
        }
        config
    }

    /// Renders the configuration as TOML.
    pub fn to_toml(&self) -> CliResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}
