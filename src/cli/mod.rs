//! CLI module for tagbox-inventory
//!
//! Follows the dynamic inventory script convention: `--list` prints every
//! group, `--host <name>` prints one host's variables.

use clap::Parser;
use std::path::PathBuf;

/// tagbox-inventory - dynamic inventory from a host/tag registry
#[derive(Parser, Debug, Clone)]
#[command(name = "tagbox-inventory")]
#[command(version)]
#[command(about = "Dynamic inventory backed by a host/tag registry", long_about = None)]
pub struct Cli {
    /// Print the full inventory (the default)
    #[arg(long, conflicts_with = "host")]
    pub list: bool,

    /// Print the variables of one host
    #[arg(long, value_name = "NAME")]
    pub host: Option<String>,

    /// Rebuild the cache from the registry before answering
    #[arg(long)]
    pub refresh_cache: bool,

    /// Path to configuration file
    #[arg(short = 'c', long, env = "TAGBOX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What the invocation asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    List,
    Host(String),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    pub fn query(&self) -> Query {
        match &self.host {
            Some(name) if !self.list => Query::Host(name.clone()),
            _ => Query::List,
        }
    }
}
