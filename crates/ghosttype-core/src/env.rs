//! Environment variable and launch argument handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
pub fn get_var_or(name: &str, default: &str) -> String {
    get_var(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable as a boolean.
pub fn get_bool(name: &str) -> bool {
    get_var(name).as_deref().map(is_truthy).unwrap_or(false)
}

/// Interpret a flag value the way every GhostType boolean variable is read.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Check whether `flag` appears among the process launch arguments.
///
/// The first element (the program name) is skipped, and anything after a
/// bare `--` is ignored.
pub fn has_launch_flag<I, S>(args: I, flag: &str) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .skip(1)
        .take_while(|a| a.as_ref() != "--")
        .any(|a| a.as_ref() == flag)
}

/// Common environment variable names.
pub mod vars {
    /// GhostType home directory override.
    pub const GHOSTTYPE_HOME: &str = "GHOSTTYPE_HOME";

    /// GhostType config file override.
    pub const GHOSTTYPE_CONFIG: &str = "GHOSTTYPE_CONFIG";

    /// GhostType log filter.
    pub const GHOSTTYPE_LOG: &str = "GHOSTTYPE_LOG";

    /// Forces the in-memory credential store.
    pub const GHOSTTYPE_CREDENTIALS_DRY_RUN: &str = "GHOSTTYPE_CREDENTIALS_DRY_RUN";
}

/// Launch arguments recognized outside of the CLI parser.
pub mod flags {
    /// Forces the in-memory credential store.
    pub const DRY_RUN_CREDENTIALS: &str = "--dry-run-credentials";
}
