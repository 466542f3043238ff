use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use catalog_cli::config::SuiteConfig;
use catalog_cli::suite::{resolve_retries, run_suite, RunMode, RunnerOptions, Suite, SuiteContext};
use catalog_client::{CatalogClient, ClientConfig};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "catalog-check", version, about = "End-to-end checks for the product catalog API")]
struct Cli {
    /// Log level (off, error, warn, info, debug, trace); overrides RUST_LOG
    #[arg(long = "log-level", global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the check suite against a catalog service
    Run(RunArgs),
    /// List the registered checks in execution order
    List,
    /// Print the build banner
    Version,
}

#[derive(Args)]
struct RunArgs {
    /// Base URL of the catalog service
    #[arg(long = "base-url", value_name = "URL")]
    base_url: Option<String>,

    /// Config file (defaults to ./catalog.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Run mode; selects the default retry count
    #[arg(long, value_enum)]
    mode: Option<RunMode>,

    /// Retries per failed check
    #[arg(long)]
    retries: Option<u32>,

    /// Per-request timeout in milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Only run checks whose "group.name" contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match dispatch(cli.command) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("error: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn dispatch(command: Commands) -> Result<bool> {
    match command {
        Commands::Run(args) => {
            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(run(args))
        }
        Commands::List => {
            for case in Suite::standard().cases() {
                println!("{}.{:<36} {}", case.group(), case.name(), case.description());
            }
            Ok(true)
        }
        Commands::Version => {
            println!(
                "{}",
                catalog_build_info::formatted_banner("catalog-check", env!("CARGO_PKG_VERSION"))
            );
            Ok(true)
        }
    }
}

async fn run(args: RunArgs) -> Result<bool> {
    tracing::info!(
        "{}",
        catalog_build_info::formatted_banner("catalog-check", env!("CARGO_PKG_VERSION"))
    );

    let mut config = SuiteConfig::load(args.config.as_deref())?;
    config.apply_env();

    let flags = ClientConfig {
        base_url: args.base_url,
        timeout_ms: args.timeout_ms,
        user_agent: None,
    };
    let resolved = flags
        .resolve_layered(&config.service)
        .context("invalid service configuration")?;
    let client = CatalogClient::from_resolved(resolved).context("failed to build catalog client")?;

    let mode = args.mode.or(config.runner.mode).unwrap_or_default();
    let (retries, retries_src) = resolve_retries(args.retries, config.runner.retries, mode);
    tracing::debug!(mode = mode.as_str(), retries, retries_src, "runner configured");

    let options = RunnerOptions {
        mode,
        retries,
        filter: args.filter,
    };
    let mut ctx = SuiteContext::new(
        client,
        config.credentials.to_credentials(),
        config.expectations.clone(),
    );
    let report = run_suite(&Suite::standard(), &mut ctx, &options).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(report.is_success())
}

/// Initialize logging based on CLI arguments and environment
fn init_logging(log_level: Option<&str>) {
    // CLI arg overrides RUST_LOG
    let filter = if let Some(level) = log_level {
        match level.to_lowercase().as_str() {
            "off" => EnvFilter::new("off"),
            "error" => EnvFilter::new("error"),
            "warn" | "warning" => EnvFilter::new("warn"),
            "info" => EnvFilter::new("info"),
            "debug" => EnvFilter::new("debug"),
            "trace" => EnvFilter::new("trace"),
            _ => {
                eprintln!("Warning: Invalid log level '{}', using 'info'", level);
                EnvFilter::new("info")
            }
        }
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
