//! Config command: print the effective configuration.

use crate::config::ConfigFile;
use crate::error::CliResult;

/// Prints `config` in the requested format.
pub fn run(config: &ConfigFile, format: &str) -> CliResult<()> {
    if format == "json" {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        print!("{}", config.to_toml()?);
    }
    Ok(())
}
