//! Command-line interface for the postcode tool
//!
//! Parses arguments with clap, turns them into a [`Command`], and runs that
//! command against a [`PostcodeClient`], writing results to the given output.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};
use thiserror::Error;

use crate::api::{HttpTransport, PostcodeClient, PostcodeError};
use crate::cache::CacheStore;
use crate::config::Config;

/// How many completions the `complete` mode prints
pub const COMPLETIONS_SHOWN: usize = 5;

/// Error types for the command-line front-end
#[derive(Debug, Error)]
pub enum CliError {
    /// The arguments don't fit the selected mode
    #[error("{0}")]
    InvalidArgs(String),

    #[error(transparent)]
    Lookup(#[from] PostcodeError),

    /// Writing to stdout failed
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Lookup mode selected with `--mode`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Check whether a postcode exists
    Validate,
    /// List postcodes starting with a prefix
    Complete,
    /// Find the postcode nearest to --lat/--lon
    Locate,
    /// Print full details for one or more postcodes
    Details,
}

/// Postcode CLI - validate, autocomplete and look up UK postcodes
#[derive(Parser, Debug)]
#[command(name = "postcode")]
#[command(about = "Validate, autocomplete and look up UK postcodes via postcodes.io")]
#[command(version)]
pub struct Cli {
    /// Lookup to perform
    #[arg(short, long, value_enum)]
    pub mode: Mode,

    /// Postcode (validate), prefix (complete) or postcodes (details)
    #[arg(value_name = "POSTCODE")]
    pub postcodes: Vec<String>,

    /// Latitude for locate mode
    #[arg(long, allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude for locate mode
    #[arg(long, allow_negative_numbers = true)]
    pub lon: Option<f64>,

    /// Base URL of the postcodes API [env: POSTCODES_API_URL]
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Path of the JSON lookup cache [env: POSTCODE_CACHE_FILE]
    #[arg(long, value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Per-request timeout in seconds [env: POSTCODES_TIMEOUT_SECS]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Applies command-line overrides on top of `config`
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(url) = &self.api_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(path) = &self.cache_file {
            config = config.with_cache_path(path.clone());
        }
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }
}

/// A fully-checked lookup request
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Validate { postcode: String },
    Complete { prefix: String },
    Locate { lat: f64, lon: f64 },
    Details { postcodes: Vec<String> },
}

impl Command {
    /// Creates a Command from parsed CLI arguments.
    ///
    /// Postcodes are trimmed and upper-cased so they print the way they are looked up.
    ///
    /// # Returns
    /// * `Ok(Command)` if the arguments fit the mode
    /// * `Err(CliError::InvalidArgs)` otherwise
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let postcodes: Vec<String> = cli
            .postcodes
            .iter()
            .map(|p| p.trim().to_uppercase())
            .collect();

        match cli.mode {
            Mode::Validate => Ok(Command::Validate {
                postcode: single_postcode(postcodes, "validate")?,
            }),
            Mode::Complete => Ok(Command::Complete {
                prefix: single_postcode(postcodes, "complete")?,
            }),
            Mode::Locate => {
                if !postcodes.is_empty() {
                    return Err(CliError::InvalidArgs(
                        "locate mode takes --lat and --lon, not a postcode".to_string(),
                    ));
                }
                match (cli.lat, cli.lon) {
                    (Some(lat), Some(lon)) => Ok(Command::Locate { lat, lon }),
                    _ => Err(CliError::InvalidArgs(
                        "locate mode requires both --lat and --lon".to_string(),
                    )),
                }
            }
            Mode::Details => {
                if postcodes.is_empty() {
                    return Err(CliError::InvalidArgs(
                        "details mode requires at least one postcode".to_string(),
                    ));
                }
                Ok(Command::Details { postcodes })
            }
        }
    }
}

fn single_postcode(mut postcodes: Vec<String>, mode: &str) -> Result<String, CliError> {
    if postcodes.len() != 1 {
        return Err(CliError::InvalidArgs(format!(
            "{mode} mode takes exactly one postcode, got {}",
            postcodes.len()
        )));
    }
    Ok(postcodes.remove(0))
}

/// Runs `command` against `client`, printing results to `out`.
///
/// No-match results from `complete` and `locate` are printed as friendly
/// messages; every other failure is returned.
pub async fn run<T, C, W>(
    command: &Command,
    client: &PostcodeClient<T, C>,
    out: &mut W,
) -> Result<(), CliError>
where
    T: HttpTransport,
    C: CacheStore,
    W: Write,
{
    match command {
        Command::Validate { postcode } => {
            if client.validate(postcode).await? {
                writeln!(out, "{postcode} is a valid postcode.")?;
            } else {
                writeln!(out, "{postcode} is not a valid postcode.")?;
            }
        }
        Command::Complete { prefix } => match client.complete(prefix).await {
            Ok(completions) => {
                for completion in completions.iter().take(COMPLETIONS_SHOWN) {
                    writeln!(out, "{completion}")?;
                }
            }
            Err(e) if e.is_not_found() => writeln!(out, "No matches for {prefix}.")?,
            Err(e) => return Err(e.into()),
        },
        Command::Locate { lat, lon } => match client.locate(*lat, *lon).await {
            Ok(postcode) => writeln!(out, "{postcode}")?,
            Err(e) if e.is_not_found() => writeln!(out, "No postcode found near {lat}, {lon}.")?,
            Err(e) => return Err(e.into()),
        },
        Command::Details { postcodes } => {
            let details = client.details(postcodes).await?;
            let pretty = serde_json::to_string_pretty(&details)
                .map_err(|e| CliError::Lookup(e.into()))?;
            writeln!(out, "{pretty}")?;
        }
    }
    Ok(())
}
