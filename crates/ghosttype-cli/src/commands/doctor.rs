//! Diagnostic commands.

use std::path::Path;

use clap::Args;
use console::style;
use ghosttype_core::config::Config;
use ghosttype_core::error::ConfigError;
use ghosttype_core::paths;
use ghosttype_secrets::{CredentialRegistry, PresenceHint, StoreMode};

use crate::render::{self, CHECK, CROSS, WARN};

/// Doctor command arguments.
#[derive(Args)]
pub struct DoctorArgs {
    /// Also re-read every credential and refresh presence hints
    #[arg(long)]
    pub full: bool,
}

/// Run the doctor command.
///
/// `config_path` is the `--config` override, if any.
pub fn run(
    args: &DoctorArgs,
    config: &Config,
    config_path: Option<&Path>,
    mode: StoreMode,
) -> anyhow::Result<()> {
    println!("GhostType Doctor\n");

    let mut errors = 0;
    let mut warnings = 0;

    // Check directories
    println!("Checking directories...");

    match paths::base_dir() {
        Ok(dir) => {
            if dir.exists() {
                println!("  {} Base directory exists: {:?}", style(CHECK).green(), dir);
            } else {
                println!("  {} Base directory missing: {:?}", style(WARN).yellow(), dir);
                warnings += 1;
            }
        }
        Err(e) => {
            println!("  {} Failed to determine base directory: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    // Check config
    println!("\nChecking configuration...");

    let loaded = match config_path {
        Some(path) => Config::load(path),
        None => Config::load_default(),
    };
    match loaded {
        Ok(_) => println!("  {} Configuration loaded", style(CHECK).green()),
        Err(ConfigError::NotFound(_)) => {
            println!("  {} Configuration file not found, using defaults", style(WARN).yellow());
            println!("    Run 'ghosttype config init' to create one");
            warnings += 1;
        }
        Err(e) => {
            println!("  {} Configuration error: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }
    match config.validate() {
        Ok(()) => println!("  {} Configuration valid", style(CHECK).green()),
        Err(e) => {
            println!("  {} Configuration invalid: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    // Check credential store
    println!("\nChecking credential store...");

    if mode == StoreMode::DryRun {
        println!(
            "  {} Dry-run mode: credentials are kept in memory only",
            style(WARN).yellow()
        );
        warnings += 1;
    }

    match CredentialRegistry::with_mode(mode, config) {
        Ok(registry) => {
            let service = registry.current();
            let report = service.self_check();
            println!();
            render::render_report(&report);
            errors += report.failures.len();

            if args.full {
                println!("\nChecking saved keys...");
                for (key, hint) in service.reconcile_presence_hints() {
                    match hint {
                        PresenceHint::Present => {
                            println!("  {} {} key saved", style(CHECK).green(), key.label())
                        }
                        _ => println!("  {} {} key not set", style(WARN).yellow(), key.label()),
                    }
                }
            }
        }
        Err(e) => {
            println!("  {} Credential store unavailable: {}", style(CROSS).red(), e);
            errors += 1;
        }
    }

    // Summary
    println!("\n{}", style("Summary").bold());
    println!(
        "  Errors: {}",
        if errors > 0 { style(errors).red() } else { style(errors).green() }
    );
    println!(
        "  Warnings: {}",
        if warnings > 0 { style(warnings).yellow() } else { style(warnings).green() }
    );

    if errors > 0 {
        anyhow::bail!("{} error(s) found", errors);
    }

    Ok(())
}
