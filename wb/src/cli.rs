//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// widgetboot - widget bootstrap orchestrator
#[derive(Parser)]
#[command(
    name = "wb",
    about = "Bootstrap a widget: configuration, resources and template modules",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Write logs to this file instead of stderr
    #[arg(long = "log-file", global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the bootstrap pipeline against a headless document
    Run {
        /// Configuration URL (becomes the host's data-conf attribute)
        #[arg(long)]
        conf: Option<String>,

        /// Extra host attribute, repeatable
        #[arg(long = "attr", value_name = "NAME=VALUE", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,

        /// Base URL for relative configuration and resource URLs
        #[arg(long)]
        base_url: Option<String>,

        /// Run without a host element
        #[arg(long, conflicts_with_all = ["conf", "attributes"])]
        no_host: bool,
    },

    /// Compile a local bootstrap module and print its steps
    CheckBootstrap {
        /// Bootstrap module file
        file: PathBuf,
    },
}

/// Parse `NAME=VALUE`; the value may be empty but the name may not
pub fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    debug!(%raw, "parse_attribute: called");
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => Ok((name.trim().to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got '{}'", raw)),
    }
}
