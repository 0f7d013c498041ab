//! Core types for credential management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use zeroize::Zeroizing;

/// Bundle identifier reported in repair diagnostics.
pub const BUNDLE_ID: &str = "app.ghosttype.GhostType";

/// Prefix of every key reference derived from a [`CredentialKey`].
pub const KEY_REF_PREFIX: &str = "ghosttype.api";

/// The credentials GhostType knows how to use, one per API provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialKey {
    OpenAi,
    Anthropic,
    Gemini,
    Groq,
    Deepgram,
    ElevenLabs,
}

impl CredentialKey {
    pub const ALL: [CredentialKey; 6] = [
        CredentialKey::OpenAi,
        CredentialKey::Anthropic,
        CredentialKey::Gemini,
        CredentialKey::Groq,
        CredentialKey::Deepgram,
        CredentialKey::ElevenLabs,
    ];

    /// Stable lowercase name, used in preference keys and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            CredentialKey::OpenAi => "openai",
            CredentialKey::Anthropic => "anthropic",
            CredentialKey::Gemini => "gemini",
            CredentialKey::Groq => "groq",
            CredentialKey::Deepgram => "deepgram",
            CredentialKey::ElevenLabs => "elevenlabs",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CredentialKey::OpenAi => "OpenAI",
            CredentialKey::Anthropic => "Anthropic",
            CredentialKey::Gemini => "Google Gemini",
            CredentialKey::Groq => "Groq",
            CredentialKey::Deepgram => "Deepgram",
            CredentialKey::ElevenLabs => "ElevenLabs",
        }
    }

    /// Key reference under which the store keeps this credential.
    pub fn key_ref(&self) -> String {
        format!("{KEY_REF_PREFIX}.{}", self.name())
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CredentialKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        CredentialKey::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<_> = CredentialKey::ALL.iter().map(|k| k.name()).collect();
                format!("unknown provider '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// Cached belief about whether a credential is stored. Never authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceHint {
    Present,
    Missing,
    Unknown,
}

impl PresenceHint {
    pub fn from_present(present: bool) -> Self {
        if present {
            PresenceHint::Present
        } else {
            PresenceHint::Missing
        }
    }
}

impl fmt::Display for PresenceHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PresenceHint::Present => "present",
            PresenceHint::Missing => "missing",
            PresenceHint::Unknown => "unknown",
        })
    }
}

/// Whether a read may prompt the user.
///
/// The file-backed store never prompts; the parameter is carried so that a
/// backend that does need consent can be added without touching callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadPolicy {
    AllowUserInteraction,
    #[default]
    NoUserInteraction,
}

impl ReadPolicy {
    pub fn allows_interaction(&self) -> bool {
        matches!(self, ReadPolicy::AllowUserInteraction)
    }
}

/// Which store variant backs a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    File,
    DryRun,
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StoreBackend::File => "file",
            StoreBackend::DryRun => "dry-run",
        })
    }
}

/// A decrypted secret held in memory.
///
/// The plaintext is zeroed on drop. Debug and Display both emit
/// `[REDACTED]` to prevent accidental logging.
#[derive(Clone, PartialEq, Eq)]
pub struct DecryptedSecret {
    inner: Zeroizing<String>,
}

impl DecryptedSecret {
    /// Trim `raw` and wrap it, or return `None` when nothing but whitespace
    /// is left.
    pub fn normalize(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self {
                inner: Zeroizing::new(trimmed.to_string()),
            })
        }
    }

    /// Expose the plaintext value. Use sparingly.
    pub fn expose(&self) -> &str {
        &self.inner
    }

    /// First and last few characters, for confirmation prompts.
    pub fn masked(&self) -> String {
        let chars: Vec<char> = self.inner.chars().collect();
        if chars.len() <= 8 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..3].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}…{tail}")
    }
}

impl fmt::Debug for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Display for DecryptedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Identity of the running executable, included in repair reports so a
/// user can tell which build touched the credential file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeIdentity {
    pub bundle_id: String,
    pub executable_path: Option<PathBuf>,
    /// Code-signing team identifier, when the platform exposes one.
    pub signing_identity: Option<String>,
}

impl RuntimeIdentity {
    /// Describe the current process.
    pub fn current() -> Self {
        let executable_path = std::env::current_exe().ok();
        let signing_identity = executable_path.as_deref().and_then(signing_identity);
        Self {
            bundle_id: BUNDLE_ID.to_string(),
            executable_path,
            signing_identity,
        }
    }
}

#[cfg(target_os = "macos")]
fn signing_identity(exe: &std::path::Path) -> Option<String> {
    // codesign writes its details to stderr.
    let output = std::process::Command::new("codesign")
        .arg("-dv")
        .arg(exe)
        .output()
        .ok()?;
    String::from_utf8_lossy(&output.stderr)
        .lines()
        .find_map(|l| l.strip_prefix("TeamIdentifier="))
        .map(str::trim)
        .filter(|v| !v.is_empty() && *v != "not set")
        .map(str::to_string)
}

#[cfg(not(target_os = "macos"))]
fn signing_identity(_exe: &std::path::Path) -> Option<String> {
    None
}

/// Outcome of a self-check, reset, or repair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepairReport {
    pub checked_at: DateTime<Utc>,
    pub runtime: RuntimeIdentity,
    pub backend: StoreBackend,
    pub store_path: Option<PathBuf>,
    /// Number of non-empty secrets readable after the operation.
    pub found_current_items: usize,
    pub failures: Vec<String>,
    pub guidance: Vec<String>,
}

impl RepairReport {
    pub fn new(backend: StoreBackend, store_path: Option<PathBuf>) -> Self {
        Self {
            checked_at: Utc::now(),
            runtime: RuntimeIdentity::current(),
            backend,
            store_path,
            found_current_items: 0,
            failures: Vec::new(),
            guidance: Vec::new(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.failures.is_empty()
    }

    pub(crate) fn fail(&mut self, failure: impl Into<String>, guidance: impl Into<String>) {
        self.failures.push(failure.into());
        self.push_guidance(guidance);
    }

    pub(crate) fn push_guidance(&mut self, guidance: impl Into<String>) {
        let guidance = guidance.into();
        if !self.guidance.contains(&guidance) {
            self.guidance.push(guidance);
        }
    }
}
