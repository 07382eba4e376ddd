//! Meteion - local automation control plane.
//!
//! Runs the HTTP control server and the webhook relay against a headless
//! console host.

mod app;
mod cli;
mod host;

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use meteion_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use crate::app::Meteion;
use crate::cli::{Cli, Commands, RunArgs};
use crate::host::ConsoleHost;

fn init_tracing(logging: &LoggingConfig) -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = ConfigLoader::expand_path(&logging.dir);
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("meteion")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The worker flushes on drop, so it must outlive main.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true).with_writer(std::io::stderr))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(&cli.config)?;

    match cli.command {
        None => run(config, RunArgs::default()).await,
        Some(Commands::Run(args)) => run(config, args).await,
        Some(Commands::Check) => check(&config),
    }
}

/// Run the console host until Ctrl-C.
async fn run(mut config: Config, args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    args.apply(&mut config);
    init_tracing(&config.logging)?;
    info!("Starting Meteion v{}", env!("CARGO_PKG_VERSION"));

    let validation = ConfigValidator::validate(&config);
    for warning in &validation.warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }
    validation.into_result()?;

    let host = Arc::new(ConsoleHost::new());
    host.spawn_stdin_reader()?;

    let app = Meteion::new(config, host.capabilities())?;
    app.start().await;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    app.shutdown().await;

    Ok(())
}

/// Print validation results. Fails if the configuration has errors.
fn check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let validation = ConfigValidator::validate(config);

    for error in &validation.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    for warning in &validation.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    if validation.is_valid() {
        println!("Configuration OK");
    }

    validation.into_result()?;
    Ok(())
}
