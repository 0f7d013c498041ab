//! Atomic file publishing.

use rand::RngCore;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Write `data` to `path` so that readers only ever observe the old file or
/// the complete new one.
///
/// The bytes go to a uniquely named sibling temp file which is synced and
/// then renamed over `path`. On Unix the temp file is created with `mode`
/// before any byte is written. A failed write leaves `path` untouched and
/// removes the temp file.
pub fn write_atomic(path: &Path, data: &[u8], mode: Option<u32>) -> io::Result<()> {
    let temp_path = temp_sibling(path);

    let result = write_and_publish(&temp_path, path, data, mode);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn write_and_publish(temp_path: &Path, path: &Path, data: &[u8], mode: Option<u32>) -> io::Result<()> {
    {
        let mut file = create_new(temp_path, mode)?;
        file.write_all(data)?;
        file.sync_all()?;
    }

    fs::rename(temp_path, path)?;

    // Best-effort: make the rename itself durable.
    #[cfg(unix)]
    {
        if let Some(dir) = path.parent().and_then(|p| File::open(p).ok()) {
            let _ = dir.sync_all();
        }
    }

    Ok(())
}

#[cfg(unix)]
fn create_new(path: &Path, mode: Option<u32>) -> io::Result<File> {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    if let Some(mode) = mode {
        options.mode(mode);
    }
    options.open(path)
}

#[cfg(not(unix))]
fn create_new(path: &Path, _mode: Option<u32>) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// `.<name>.<random>.tmp` next to `path`.
fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "ghosttype".to_string());
    let suffix = rand::thread_rng().next_u64();
    path.with_file_name(format!(".{name}.{suffix:016x}.tmp"))
}

/// Restrict `path` to the given Unix mode. No-op elsewhere.
pub fn set_mode(path: &Path, mode: u32) -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }
    #[cfg(not(unix))]
    {
        let _ = (path, mode);
        Ok(())
    }
}
