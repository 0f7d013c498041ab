//! Credential management commands.
//!
//! Provides `ghosttype credentials set|get|delete|reset|check|repair|status|count`
//! on top of the active [`CredentialService`](ghosttype_secrets::CredentialService).

use clap::Args;
use console::style;
use ghosttype_secrets::{CredentialKey, CredentialRegistry, ReadPolicy};

use crate::render;

/// Credentials command arguments.
#[derive(Args)]
pub struct CredentialsArgs {
    #[command(subcommand)]
    pub command: CredentialsCommand,
}

#[derive(clap::Subcommand)]
pub enum CredentialsCommand {
    /// Store an API key (prompts for the value)
    Set {
        /// Provider name (openai, anthropic, gemini, groq, deepgram, elevenlabs)
        key: CredentialKey,

        /// Key value (if omitted, prompts for hidden input)
        #[arg(long)]
        value: Option<String>,
    },

    /// Show a stored API key (masked unless --reveal)
    Get {
        /// Provider name
        key: CredentialKey,

        /// Print the full value
        #[arg(long)]
        reveal: bool,
    },

    /// Delete a stored API key
    Delete {
        /// Provider name
        key: CredentialKey,
    },

    /// Delete every stored API key
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Check the credential store without changing it
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check the store and offer a reset if it is unreadable
    Repair {
        /// Reset without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// Show which providers have a saved key
    Status {
        /// Re-read the store instead of using cached hints
        #[arg(long)]
        refresh: bool,
    },

    /// Print the number of saved keys
    Count,
}

/// Run the credentials command against the registry's active service.
pub fn run(args: &CredentialsArgs, registry: &CredentialRegistry) -> anyhow::Result<()> {
    let service = registry.current();

    match &args.command {
        CredentialsCommand::Set { key, value } => {
            let value = match value {
                Some(v) => v.clone(),
                None => {
                    let prompt = format!("Enter {} API key: ", key.label());
                    rpassword::prompt_password(prompt)
                        .map_err(|e| anyhow::anyhow!("Failed to read value: {}", e))?
                }
            };

            service
                .set_secret(&value, *key)
                .map_err(|e| anyhow::anyhow!("{}", e))?;

            if value.trim().is_empty() {
                println!("{} key cleared.", key.label());
            } else {
                println!("{} key stored ({}).", key.label(), service.backend());
            }
        }

        CredentialsCommand::Get { key, reveal } => {
            match service.get_secret(*key, ReadPolicy::NoUserInteraction) {
                Some(secret) if *reveal => println!("{}", secret.expose()),
                Some(secret) => println!("{}", secret.masked()),
                None => anyhow::bail!("No {} key stored", key.label()),
            }
        }

        CredentialsCommand::Delete { key } => {
            service
                .delete_secret(*key)
                .map_err(|e| anyhow::anyhow!("{}", e))?;
            println!("{} key deleted.", key.label());
        }

        CredentialsCommand::Reset { yes } => {
            if !yes && !render::confirm("Delete every saved API key?") {
                println!("Aborted.");
                return Ok(());
            }
            let report = service.delete_all_secrets();
            render::render_report(&report);

            // The reset itself never fails; confirm the store is usable now.
            let after = service.self_check();
            if !after.is_healthy() {
                println!();
                render::render_report(&after);
                anyhow::bail!("reset did not complete");
            }
        }

        CredentialsCommand::Check { json } => {
            let report = service.self_check();
            if *json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                render::render_report(&report);
            }
            if !report.is_healthy() {
                anyhow::bail!("{} problem(s) found", report.failures.len());
            }
        }

        CredentialsCommand::Repair { yes } => {
            let report = service.run_interactive_repair(ReadPolicy::AllowUserInteraction, |check| {
                if *yes {
                    return true;
                }
                render::render_report(check);
                println!();
                render::confirm("Reset the credential store? Saved keys will be lost.")
            });
            render::render_report(&report);
            if !report.is_healthy() {
                anyhow::bail!("credential store is still unhealthy");
            }
        }

        CredentialsCommand::Status { refresh } => {
            let rows = if *refresh {
                service.reconcile_presence_hints()
            } else {
                CredentialKey::ALL
                    .iter()
                    .map(|k| (*k, service.presence_hint(*k)))
                    .collect()
            };
            render::render_presence(&rows);
            if !refresh {
                println!(
                    "\n{}",
                    style("Hints are cached; use --refresh to re-read the store.").dim()
                );
            }
        }

        CredentialsCommand::Count => {
            println!("{}", service.saved_secret_count());
        }
    }

    Ok(())
}
