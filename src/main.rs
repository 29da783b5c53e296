//! tagbox-inventory - dynamic inventory from a host/tag registry
//!
//! This is the main entry point for the inventory script. Inventory JSON goes
//! to stdout; logs and diagnostics go to stderr.

mod cli;

use cli::{Cli, Query};
use tagbox_inventory::config::Config;
use tagbox_inventory::error::{Error, Result};
use tagbox_inventory::output;
use tagbox_inventory::pipeline::Pipeline;
use tracing::{debug, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Application version information
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    if cli.verbosity() >= 2 {
        eprintln!("tagbox-inventory v{}", VERSION);
    }

    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            if e.is_registry_error() {
                warn!("registry unavailable, cached inventory left unchanged");
            }
            output::error(&e.to_string());
            e.exit_code()
        }
    };

    std::process::exit(exit_code);
}

/// Initialize logging based on verbosity level
fn init_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbosity >= 3),
        )
        .with(env_filter)
        .init();
}

fn run(cli: &Cli) -> Result<i32> {
    let config =
        Config::load(cli.config.as_ref()).map_err(|e| Error::Config(format!("{:#}", e)))?;

    let user = std::env::var("USER").unwrap_or_default();
    if config.is_denied(&user) {
        output::error(&format!("user '{}' is not allowed to run this inventory", user));
        return Ok(1);
    }

    if config.has_placeholder_token() {
        output::notice("Set registry.token in tagbox.toml to your registry access token.");
        return Ok(0);
    }

    let settings = config.settings()?;
    debug!(
        cache = %settings.store.index_path().display(),
        ttl_secs = settings.ttl.as_secs(),
        "settings resolved"
    );

    let mut pipeline = Pipeline::connect(settings, cli.refresh_cache)?;
    let stdout = std::io::stdout().lock();

    let written = match cli.query() {
        Query::List => {
            if cli.verbosity() >= 2 {
                eprint!("{}", pipeline.list());
            }
            output::write_json(stdout, pipeline.list())
        }
        Query::Host(name) => {
            let record = pipeline.host(&name)?;
            output::write_json(stdout, &record)
        }
    };
    written.map_err(|e| Error::io("<stdout>", e))?;

    Ok(0)
}
