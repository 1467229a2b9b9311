mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use asana_api::{ApiClient, ApiError};
use asana_cli_config::{Config, Profile};
use asana_cli_output::{OutputFormat, OutputRenderer};
use clap::Parser;
use colored::Colorize;
use commands::{AsanaCommand, AsanaContext};
use tracing_subscriber::{fmt, EnvFilter};

const API_KEY_ENV: &str = "ASANA_API_KEY";

#[derive(Parser, Debug)]
#[command(name = "asana-cli", version, about = "Command line client for Asana", long_about = None)]
struct Cli {
    /// Profile to use from config file
    #[arg(short, long)]
    profile: Option<String>,

    /// Path to config file (defaults to ~/.asana-cli/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format for command results
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,

    /// Enable verbose logging
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: AsanaCommand,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.debug)?;

    let config = Config::load(cli.config.as_ref())?;
    let client = build_client(&config, cli.profile.as_deref())?;
    let renderer = OutputRenderer::new(cli.output);

    commands::execute(
        cli.command,
        AsanaContext {
            client,
            renderer: &renderer,
        },
    )
    .await
}

fn init_tracing(debug: bool) -> Result<()> {
    let default = if debug {
        "info,asana_api=debug,asana_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logger: {err}"))
}

fn report(err: &anyhow::Error) {
    eprintln!("{} {:#}", "error:".red().bold(), err);
    if let Some(hint) = err.downcast_ref::<ApiError>().and_then(ApiError::suggestion) {
        eprintln!("{} {}", "hint:".yellow().bold(), hint);
    }
}

fn build_client(config: &Config, requested: Option<&str>) -> Result<ApiClient> {
    let (name, profile) = match config.resolve_profile(requested) {
        Some((name, profile)) => (name.to_string(), profile.clone()),
        None => match requested {
            Some(name) => return Err(anyhow!("Profile '{name}' not found in config file.")),
            None => ("default".to_string(), Profile::default()),
        },
    };

    let api_key = resolve_api_key(&name, &profile, |var| std::env::var(var).ok())?;
    ApiClient::new(profile.client_config(api_key))
        .with_context(|| format!("Failed to build client for profile '{name}'"))
}

/// Key lookup order: `ASANA_API_KEY_<PROFILE>`, `ASANA_API_KEY`, then the
/// profile's `api_key`.
fn resolve_api_key(
    name: &str,
    profile: &Profile,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String> {
    let profile_var = format!("{API_KEY_ENV}_{}", name.to_uppercase().replace('-', "_"));
    env(&profile_var)
        .filter(|k| !k.trim().is_empty())
        .or_else(|| env(API_KEY_ENV).filter(|k| !k.trim().is_empty()))
        .or_else(|| profile.api_key.clone().filter(|k| !k.trim().is_empty()))
        .ok_or_else(|| {
            anyhow!(
                "No API key found for profile '{name}'. Set {profile_var} or {API_KEY_ENV}, or add api_key to the profile."
            )
        })
}
