//! ldpsync CLI
//!
//! Pushes CMS entities into an LDP repository from the command line.
//!
//! # Commands
//!
//! - `save` - Synchronize an entity's current CMS state
//! - `delete` - Remove an entity's repository resource
//! - `version` - Snapshot an entity's repository resource
//! - `resolve` - Show (or mint) the repository location of an identifier
//! - `config` - Print the effective configuration

mod commands;
mod config;
mod error;
mod http;

use clap::{Args, Parser, Subcommand};
use config::ConfigFile;
use ldpsync_protocol::header;
use ldpsync_server::{InboundRequest, Operation};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// CMS to LDP repository synchronizer.
#[derive(Parser)]
#[command(name = "ldpsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(global = true, short, long, env = "LDPSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Output format (text, json)
    #[arg(global = true, short, long, default_value = "text")]
    format: String,

    #[command(subcommand)]
    command: Commands,
}

/// Per-invocation upstream settings.
#[derive(Args)]
struct Upstream {
    /// Repository root overriding the configured one
    #[arg(short, long)]
    base: Option<String>,

    /// Bearer token forwarded to the CMS and the repository
    #[arg(short, long, env = "LDPSYNC_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Synchronize an entity's current CMS state
    Save {
        /// CMS identifier (UUID)
        #[arg(long)]
        id: String,

        /// Entity kind (node, media, external-file)
        #[arg(short, long, default_value = "node")]
        kind: String,

        /// CMS URL serving the entity as JSON-LD
        #[arg(short, long)]
        locator: String,

        #[command(flatten)]
        upstream: Upstream,
    },

    /// Remove an entity's repository resource
    Delete {
        /// CMS identifier (UUID)
        #[arg(long)]
        id: String,

        #[command(flatten)]
        upstream: Upstream,
    },

    /// Snapshot an entity's repository resource
    Version {
        /// CMS identifier (UUID)
        #[arg(long)]
        id: String,

        #[command(flatten)]
        upstream: Upstream,
    },

    /// Show the repository location of an identifier
    Resolve {
        /// CMS identifier (UUID)
        #[arg(long)]
        id: String,

        /// Repository root overriding the configured one
        #[arg(short, long)]
        base: Option<String>,

        /// Create a mapping if the resolver keeps one
        #[arg(short, long)]
        mint: bool,
    },

    /// Print the effective configuration
    Config,
}

fn request(operation: Operation, id: String, upstream: &Upstream) -> InboundRequest {
    commands::operate::with_upstream(
        InboundRequest::new(operation, id),
        upstream.base.as_deref(),
        upstream.token.as_deref(),
    )
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = ConfigFile::load(cli.config.as_deref())?;

    let succeeded = match cli.command {
        Commands::Save {
            id,
            kind,
            locator,
            upstream,
        } => {
            let request = request(Operation::Save, id, &upstream)
                .with_kind(kind)
                .with_header(header::CONTENT_LOCATION, locator);
            commands::operate::run(&config, &request, &cli.format)?
        }
        Commands::Delete { id, upstream } => {
            let request = request(Operation::Delete, id, &upstream);
            commands::operate::run(&config, &request, &cli.format)?
        }
        Commands::Version { id, upstream } => {
            let request = request(Operation::Version, id, &upstream);
            commands::operate::run(&config, &request, &cli.format)?
        }
        Commands::Resolve { id, base, mint } => {
            commands::resolve::run(&config, &id, base.as_deref(), mint)?
        }
        Commands::Config => {
            commands::show_config::run(&config, &cli.format)?;
            true
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn save_arguments_parse() {
        let cli = Cli::try_parse_from([
            "ldpsync",
            "save",
            "--id",
            "0a1b2c3d-0000-4000-8000-000000000001",
            "--kind",
            "media",
            "--locator",
            "http://cms/media/1?_format=jsonld",
            "--base",
            "http://repo/rest",
        ])
        .unwrap();
        let Commands::Save {
            kind,
            locator,
            upstream,
            ..
        } = cli.command
        else {
            panic!("expected save");
        };
        assert_eq!(kind, "media");
        assert_eq!(locator, "http://cms/media/1?_format=jsonld");
        assert_eq!(upstream.base.as_deref(), Some("http://repo/rest"));
    }

    #[test]
    fn save_requires_locator() {
        assert!(Cli::try_parse_from(["ldpsync", "save", "--id", "x"]).is_err());
    }
}
