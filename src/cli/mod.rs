//! cli
//!
//! Command-line interface for the metadata service client.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the tracing subscriber
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, resolves the adapter
//! configuration and hands a [`crate::client::MetadataClient`] to the command
//! handler. Results are printed as JSON on stdout; logs go to stderr.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MDSC_LOG";

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_tracing(cli.debug);

    let ctx = commands::Context {
        config_path: cli.config,
        adapter: cli.adapter,
        entity_type: cli.entity_type,
        entity_id: cli.entity_id,
        prefix: cli.prefix,
    };

    commands::dispatch(cli.command, &ctx)
}

/// Install the global subscriber.
///
/// `--debug` wins over `MDSC_LOG`; without either only warnings are shown.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("metadata_service_client=debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    // A subscriber may already be installed when embedded; keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init();
}
