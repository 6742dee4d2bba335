//! Signed reply CLI.
//!
//! This tool provides commands for:
//! - Creating replies, optionally signed
//! - Signing replies stored as JSON
//! - Verifying signed replies
//! - Validating settings files

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;

mod config;
mod error;
mod reply;

use error::CliError;
use signed_reply_common::logging::init_logging;

/// Exit code for a reply that failed verification.
const EXIT_INVALID: i32 = 2;

#[derive(Parser)]
#[command(name = "srcli")]
#[command(about = "Create, sign and verify signed replies")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Settings file providing the signing secret
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Signing secret, overriding the configured one
    #[arg(long, global = true, env = "SIGNED_REPLY_SECRET", hide_env_values = true)]
    secret: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new reply and print it as JSON
    Create {
        /// Create an error reply with this message
        #[arg(long)]
        error: Option<String>,

        /// Result entry as key=value; the value is parsed as JSON if possible
        #[arg(long = "result", short, value_parser = reply::parse_result)]
        results: Vec<(String, Value)>,

        /// Sign the reply before printing it
        #[arg(long)]
        sign: bool,
    },

    /// Sign a reply stored as JSON and print the signed reply
    Sign {
        /// Path to the reply JSON file
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Verify a signed reply stored as JSON
    Verify {
        /// Path to the reply JSON file
        #[arg(long, short)]
        file: PathBuf,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Validate a settings file
    Validate {
        /// Path to the TOML settings file
        #[arg(long, short)]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    if let Err(e) = init_logging(level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_INVALID),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Run the selected command. `Ok(false)` means a reply failed verification.
fn run(cli: Cli) -> Result<bool, CliError> {
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Create {
            error,
            results,
            sign,
        } => {
            let context = if sign {
                Some(config::resolve_secret(cli.secret, config_file)?)
            } else {
                None
            };
            println!("{}", reply::create(error, results, context.as_ref())?);
        }
        Commands::Sign { file } => {
            let context = config::resolve_secret(cli.secret, config_file)?;
            println!("{}", reply::sign_file(&file, &context)?);
        }
        Commands::Verify { file } => {
            let context = config::resolve_secret(cli.secret, config_file)?;
            let valid = reply::verify_file(&file, &context)?;
            println!("{}", if valid { "valid" } else { "invalid" });
            return Ok(valid);
        }
        Commands::Config { action } => match action {
            ConfigAction::Validate { file } => config::validate(file)?,
        },
    }

    Ok(true)
}
