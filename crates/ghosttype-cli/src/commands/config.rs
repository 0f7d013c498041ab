//! Configuration management commands.

use std::path::{Path, PathBuf};

use clap::Args;
use ghosttype_core::config::Config;
use serde_json::Value;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show configuration
    Show,

    /// Get a configuration value
    Get {
        /// Configuration key (dot-separated path, e.g. credentials.dry_run)
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,

        /// Value to set (parsed as JSON, falling back to a plain string)
        value: String,
    },

    /// Write a default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration
    Validate,
}

/// Run the config command.
///
/// `path` is the `--config` override, if any.
pub fn run(args: ConfigArgs, path: Option<&Path>) -> anyhow::Result<()> {
    let path: PathBuf = match path {
        Some(p) => p.to_path_buf(),
        None => Config::default_path()?,
    };

    match args.command {
        ConfigCommand::Show => {
            let config = Config::load_or_default(Some(&path));
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        ConfigCommand::Get { key } => {
            let config = Config::load_or_default(Some(&path));
            let json = serde_json::to_value(&config)?;
            match get_path(&json, &key) {
                Some(v) => println!("{}", serde_json::to_string_pretty(v)?),
                None => anyhow::bail!("Key not found: {}", key),
            }
        }

        ConfigCommand::Set { key, value } => {
            let config = Config::load_or_default(Some(&path));
            let mut json = serde_json::to_value(&config)?;
            set_path(&mut json, &key, &value);

            // Deserialize back to Config to validate the shape is still correct
            let updated: Config = serde_json::from_value(json)
                .map_err(|e| anyhow::anyhow!("Invalid configuration after set: {}", e))?;
            updated.validate()?;
            updated.save(&path)?;

            println!("Set {} = {}", key, value);
        }

        ConfigCommand::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {}. Use --force to overwrite.",
                    path.display()
                );
            }

            Config::default().save(&path)?;
            println!("Created config file: {}", path.display());
        }

        ConfigCommand::Path => {
            println!("{}", path.display());
        }

        ConfigCommand::Validate => match Config::load(&path) {
            Ok(config) => match config.validate() {
                Ok(()) => println!("Configuration is valid"),
                Err(e) => anyhow::bail!("Configuration error: {}", e),
            },
            Err(e) => anyhow::bail!("Failed to load config: {}", e),
        },
    }

    Ok(())
}

/// Walk a dot-separated key path.
fn get_path<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |v, k| v.get(k))
}

/// Set a dot-separated key path, creating intermediate objects as needed.
/// The value is parsed as JSON first (numbers, bools), then as a plain string.
fn set_path(json: &mut Value, key: &str, value: &str) {
    let parsed: Value =
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    let parts: Vec<&str> = key.split('.').collect();
    let mut current = json;
    for (i, part) in parts.iter().enumerate() {
        if i == parts.len() - 1 {
            current[*part] = parsed;
            return;
        }
        if !current.get(*part).is_some_and(Value::is_object) {
            current[*part] = serde_json::json!({});
        }
        current = &mut current[*part];
    }
}
