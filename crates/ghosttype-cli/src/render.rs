//! Terminal rendering utilities.
//!
//! Repair reports, presence tables, and the confirmation prompt used before
//! destructive credential operations.

use console::{style, Emoji};
use ghosttype_secrets::{CredentialKey, PresenceHint, RepairReport};

pub static CHECK: Emoji = Emoji("✓", "+");
pub static CROSS: Emoji = Emoji("✗", "x");
pub static WARN: Emoji = Emoji("⚠", "!");

/// Render a self-check, reset, or repair report.
pub fn render_report(report: &RepairReport) {
    let status = if report.is_healthy() {
        format!("{} healthy", style(CHECK).green())
    } else {
        format!("{} {} problem(s)", style(CROSS).red(), report.failures.len())
    };
    println!("{} {}", style("Credential store").bold(), status);

    println!("  {:<12} {}", style("backend").dim(), report.backend);
    match &report.store_path {
        Some(path) => println!("  {:<12} {}", style("file").dim(), path.display()),
        None => println!("  {:<12} {}", style("file").dim(), style("(in memory)").dim()),
    }
    println!("  {:<12} {}", style("saved keys").dim(), report.found_current_items);
    println!(
        "  {:<12} {}",
        style("checked").dim(),
        report.checked_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(exe) = &report.runtime.executable_path {
        println!("  {:<12} {}", style("executable").dim(), exe.display());
    }
    if let Some(identity) = &report.runtime.signing_identity {
        println!("  {:<12} {}", style("signed by").dim(), identity);
    }

    for failure in &report.failures {
        println!("  {} {}", style(CROSS).red(), failure);
    }
    for guidance in &report.guidance {
        println!("  {} {}", style(WARN).yellow(), style(guidance).dim());
    }
}

/// Render one line per credential with its presence hint.
pub fn render_presence(rows: &[(CredentialKey, PresenceHint)]) {
    println!("{:<12} {:<24} {}", "NAME", "PROVIDER", "STATUS");
    println!("{}", "-".repeat(48));
    for (key, hint) in rows {
        let status = match hint {
            PresenceHint::Present => style(hint.to_string()).green(),
            PresenceHint::Missing => style(hint.to_string()).red(),
            PresenceHint::Unknown => style(hint.to_string()).dim(),
        };
        println!("{:<12} {:<24} {}", key.name(), key.label(), status);
    }
}

/// Ask a yes/no question on stderr. Anything but `y`/`yes` is a no.
pub fn confirm(question: &str) -> bool {
    eprint!("{} {} ", style("?").yellow().bold(), style(question).bold());
    eprint!("{} ", style("[y/N]").dim());

    let mut input = String::new();
    if std::io::stdin().read_line(&mut input).is_ok() {
        is_yes(&input)
    } else {
        false
    }
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}
