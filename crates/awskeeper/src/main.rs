use anyhow::{Context, Result};
use awskeeper::commands::{S3Command, SnapshotCommand};
use awskeeper::CommandContext;
use awskeeper_config::{Platform, RuntimeConfig, StdEnvSource};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Housekeeping for S3 bucket lifecycle rules and Redshift Serverless snapshots
#[derive(Parser)]
#[command(name = "awskeeper")]
#[command(version)]
#[command(about = "Housekeeping for S3 bucket lifecycle rules and Redshift Serverless snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// AWS region (overrides the profile's region)
    #[arg(long, value_name = "REGION", global = true)]
    region: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// S3 bucket lifecycle rules
    S3 {
        #[command(subcommand)]
        command: S3Command,
    },
    /// Redshift Serverless snapshot schedules
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommand,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Step 1: config file and environment
    let mut config = RuntimeConfig::load_with(Platform::Cli, cli.config.as_deref(), &StdEnvSource)
        .context("Failed to load configuration")?;

    // Step 2: command-line flags win
    apply_cli_overrides(&mut config, &cli);
    awskeeper::init_tracing(&config);
    tracing::debug!(
        source = config.source.as_deref().unwrap_or("defaults"),
        "Loaded configuration"
    );

    let ctx = CommandContext::new(config);
    let succeeded = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(async move {
            match cli.command {
                Commands::S3 { command } => command.run(&ctx).await,
                Commands::Snapshot { command } => command.run(&ctx).await,
            }
        })?;

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) {
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if let Some(region) = &cli.region {
        config.aws.region = Some(region.clone());
    }
}
