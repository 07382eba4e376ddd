//! CLI definitions for Meteion.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Meteion CLI.
#[derive(Parser)]
#[command(name = "meteion")]
#[command(about = "Local automation control plane with webhook relay")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/meteion.toml", global = true)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Run the headless console host until Ctrl-C (default)
    Run(RunArgs),

    /// Validate the configuration and exit
    Check,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    /// Control server port (overrides config)
    #[arg(long)]
    pub port: Option<u16>,

    /// Webhook base address (overrides config)
    #[arg(long)]
    pub webhook: Option<String>,

    /// Do not start the control server
    #[arg(long)]
    pub no_server: bool,

    /// Start the webhook relay immediately
    #[arg(long)]
    pub webhook_start: bool,
}

impl RunArgs {
    pub fn apply(&self, config: &mut meteion_config::Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(ref url) = self.webhook {
            config.webhook.url = url.clone();
        }
        if self.no_server {
            config.server.auto_start = false;
        }
        if self.webhook_start {
            config.webhook.auto_start = true;
        }
    }
}
