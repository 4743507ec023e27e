//! Postcode CLI - validate, autocomplete and look up UK postcodes
//!
//! A command-line client for the postcodes.io API that keeps validation and
//! autocomplete results in a local JSON cache.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use postcode::api::{PostcodeClient, ReqwestTransport};
use postcode::cache::FileCache;
use postcode::cli::{self, Cli, Command};
use postcode::config::Config;

/// Sets up logging to stderr so stdout only carries command output.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags pick the level.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Check arguments before touching the network or the cache
    let command = Command::from_cli(&cli)?;
    let config = cli.apply_overrides(Config::from_env()?);
    tracing::debug!(?config, "resolved configuration");

    let transport = ReqwestTransport::new(config.timeout)?;
    let cache = FileCache::new(&config.cache_path);
    let client = PostcodeClient::new(transport, cache, &config.base_url)?;

    let mut stdout = io::stdout().lock();
    cli::run(&command, &client, &mut stdout).await?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
