//! GhostType command-line interface.

pub mod commands;
pub mod render;

use clap::{Parser, Subcommand};
use ghosttype_core::config::Config;
use ghosttype_secrets::{CredentialRegistry, StoreMode};

/// GhostType - local credential management
#[derive(Parser)]
#[command(name = "ghosttype")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true, env = "GHOSTTYPE_CONFIG")]
    pub config: Option<std::path::PathBuf>,

    /// Keep credentials in memory only; nothing is written to disk
    #[arg(long, global = true)]
    pub dry_run_credentials: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage stored API keys
    Credentials(commands::credentials::CredentialsArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Run diagnostics
    Doctor(commands::doctor::DoctorArgs),

    /// Show version information
    Version,
}

impl Cli {
    /// Store mode for this invocation. The flag is already parsed by clap, the
    /// environment and config are consulted through [`StoreMode::from_process`].
    pub fn store_mode(&self, config: &Config) -> StoreMode {
        if self.dry_run_credentials {
            StoreMode::DryRun
        } else {
            StoreMode::from_process(config)
        }
    }
}

/// Run the CLI with the given arguments.
pub fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    match cli.command {
        Commands::Credentials(ref args) => {
            let registry = CredentialRegistry::with_mode(cli.store_mode(&config), &config)
                .map_err(|e| anyhow::anyhow!("Failed to open credential store: {}", e))?;
            commands::credentials::run(args, &registry)
        }
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()),
        Commands::Doctor(ref args) => {
            let mode = cli.store_mode(&config);
            commands::doctor::run(args, &config, cli.config.as_deref(), mode)
        }
        Commands::Version => {
            println!("ghosttype {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
