//! Resolve command: show (or mint) the repository location of an identifier.

use crate::config::ConfigFile;
use crate::error::CliResult;
use ldpsync_resolver::{build_resolver, PathResolver};

/// Prints the location for `identifier`. Returns whether one exists.
pub fn run(config: &ConfigFile, identifier: &str, base: Option<&str>, mint: bool) -> CliResult<bool> {
    let resolver = build_resolver(&config.resolver)?;
    let base = base.unwrap_or(&config.repository_base);
    match locate(resolver.as_ref(), identifier, base, mint)? {
        Some(uri) => {
            println!("{}", uri);
            Ok(true)
        }
        None => {
            println!("no mapping for {}", identifier);
            Ok(false)
        }
    }
}

fn locate(
    resolver: &dyn PathResolver,
    identifier: &str,
    base: &str,
    mint: bool,
) -> CliResult<Option<String>> {
    if mint && resolver.supports_minting() {
        return Ok(Some(resolver.mint(identifier, base)?.uri()));
    }
    Ok(resolver.resolve(identifier, base)?.map(|l| l.uri()))
}
