//! GhostType CLI entry point.

use clap::Parser;
use ghosttype_cli::{run, Cli};
use ghosttype_core::config::Config;
use ghosttype_core::env::{self, vars};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(cli.config.as_deref());

    // RUST_LOG wins, then -v, then GHOSTTYPE_LOG, then the config file.
    let default_filter = if cli.verbose > 0 {
        "ghosttype=debug".to_string()
    } else {
        env::get_var_or(
            vars::GHOSTTYPE_LOG,
            &format!("ghosttype={}", config.logging.level.as_str()),
        )
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    run(cli, config)
}
