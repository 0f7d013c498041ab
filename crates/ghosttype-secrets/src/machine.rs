//! Per-machine key derivation.
//!
//! The credential key is never stored. It is recomputed on every start as
//! `SHA-256(APP_SALT + "." + hardware_id)`, so the same machine always gets
//! the same key and a copied credential file is unreadable elsewhere.
//!
//! When no hardware identifier can be read the derivation falls back to
//! [`FALLBACK_MACHINE_ID`]. Every such host shares one key, which makes the
//! file readable by anyone holding a copy. The fallback is logged at `warn`
//! level and must not become a hard failure.

use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::crypto::{EncryptionKey, KEY_SIZE};

/// Fixed application salt mixed into every derived key.
pub const APP_SALT: &str = "app.ghosttype.credentials.v1";

/// Identifier used when the host exposes no hardware identifier.
pub const FALLBACK_MACHINE_ID: &str = "ghosttype-unknown-machine";

/// Where the machine identifier came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MachineIdSource {
    Hardware(String),
    Fallback,
}

impl MachineIdSource {
    pub fn id(&self) -> &str {
        match self {
            MachineIdSource::Hardware(id) => id,
            MachineIdSource::Fallback => FALLBACK_MACHINE_ID,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, MachineIdSource::Fallback)
    }
}

/// Derive the store key from a salt and a machine identifier.
pub fn derive_key(salt: &str, machine_id: &str) -> EncryptionKey {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b".");
    hasher.update(machine_id.as_bytes());

    let mut bytes = [0u8; KEY_SIZE];
    bytes.copy_from_slice(&hasher.finalize());
    EncryptionKey::from_bytes(bytes)
}

/// Look up this host's identifier, falling back to the fixed constant.
pub fn machine_id() -> MachineIdSource {
    match hardware_id() {
        Some(id) => {
            debug!("using hardware identifier for credential key");
            MachineIdSource::Hardware(id)
        }
        None => {
            warn!(
                "no hardware identifier available; credential key falls back to a \
                 shared constant and only protects against casual inspection"
            );
            MachineIdSource::Fallback
        }
    }
}

/// The key for this machine's credential store.
pub fn machine_key() -> EncryptionKey {
    derive_key(APP_SALT, machine_id().id())
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// ---------------------------------------------------------------------------
// Platform lookups
// ---------------------------------------------------------------------------

#[cfg(target_os = "macos")]
fn hardware_id() -> Option<String> {
    let output = std::process::Command::new("ioreg")
        .args(["-rd1", "-c", "IOPlatformExpertDevice"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_ioreg_uuid(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(target_os = "linux")]
fn hardware_id() -> Option<String> {
    ["/etc/machine-id", "/var/lib/dbus/machine-id"]
        .iter()
        .find_map(|path| std::fs::read_to_string(path).ok().and_then(|s| non_empty(&s)))
}

#[cfg(target_os = "windows")]
fn hardware_id() -> Option<String> {
    let output = std::process::Command::new("reg")
        .args([
            "query",
            r"HKLM\SOFTWARE\Microsoft\Cryptography",
            "/v",
            "MachineGuid",
        ])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    parse_reg_machine_guid(&String::from_utf8_lossy(&output.stdout))
}

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
fn hardware_id() -> Option<String> {
    None
}

/// Extract the value from a line like `"IOPlatformUUID" = "ABCD-..."`.
#[cfg_attr(not(any(target_os = "macos", test)), allow(dead_code))]
fn parse_ioreg_uuid(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.contains("\"IOPlatformUUID\""))?;
    let (_, value) = line.split_once('=')?;
    non_empty(value.trim().trim_matches('"'))
}

/// Extract the value from a line like `MachineGuid    REG_SZ    1234-...`.
#[cfg_attr(not(any(target_os = "windows", test)), allow(dead_code))]
fn parse_reg_machine_guid(output: &str) -> Option<String> {
    let line = output.lines().find(|l| l.trim_start().starts_with("MachineGuid"))?;
    line.split_whitespace().nth(2).and_then(non_empty)
}
