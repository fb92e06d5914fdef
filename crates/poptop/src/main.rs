//! PopTop command line tool
//!
//! Inspects how paths and parameters are interpreted, validates mock
//! configuration files, and replays request scripts against them.
//!
//! Usage:
//!   poptop normalize /users/42/pets/7
//!   poptop params 'name=Rex%20II&tag=dog'
//!   poptop --config mocks.yaml check
//!   poptop --config mocks.yaml replay requests.txt

use anyhow::Context;
use clap::{Parser, Subcommand};
use poptop::config::MockConfig;
use poptop::replay::{parse_script, run_script};
use poptop::{normalize, parse_params, Dispatcher, Registry};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// PopTop - in-process mock REST resources
#[derive(Parser, Debug)]
#[command(name = "poptop")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Mock configuration file (YAML or JSON)
    #[arg(short, long, global = true, env = "POPTOP_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set (overrides the config file)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the template and ids a path normalizes to
    Normalize {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Parse a query string or form body into parameters
    Params { input: String },
    /// Validate the configuration and list the resources it defines
    Check,
    /// Run a request script against the configured resources
    Replay {
        /// Script with one `<METHOD> <TARGET> [BODY]` per line
        script: PathBuf,

        /// Exit with an error if any request was unhandled or failed
        #[arg(short, long)]
        strict: bool,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = match &args.config {
        Some(path) => Some(
            MockConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
        ),
        None => None,
    };

    let log = config.as_ref().map(|c| c.log.clone()).unwrap_or_default();
    let level = args.log_level.clone().unwrap_or(log.level);
    init_tracing(&level, args.log_json || log.json);

    match args.command {
        Command::Normalize { paths } => {
            for path in paths {
                let normalized = normalize(&path);
                println!("{}", serde_json::to_string(&normalized)?);
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Params { input } => {
            // Blank input prints `null`
            let params = parse_params(&input);
            println!("{}", serde_json::to_string_pretty(&params)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Check => {
            let config = config.context("check requires --config")?;
            for definition in &config.resources {
                let kind = if definition.rest { "rest" } else { "passthrough" };
                println!("{:<12} {}", kind, definition.template());
            }
            info!("{} resources valid", config.resources.len());
            Ok(ExitCode::SUCCESS)
        }
        Command::Replay { script, strict } => {
            let registry = Arc::new(Registry::new());
            if let Some(config) = &config {
                config.install(&registry)?;
            }
            let dispatcher = Dispatcher::new(registry);

            let contents = std::fs::read_to_string(&script)
                .with_context(|| format!("Failed to read script {}", script.display()))?;
            let lines = parse_script(&contents)?;
            debug!("Replaying {} requests", lines.len());

            let records = run_script(&dispatcher, &lines);
            let mut misses = 0;
            for record in &records {
                println!("{record}");
                if !record.is_served() {
                    misses += 1;
                }
            }
            info!("Replayed {} requests, {} not served", records.len(), misses);

            if strict && misses > 0 {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
