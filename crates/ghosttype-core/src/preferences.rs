//! Lightweight process-wide preference flags.
//!
//! Holds small boolean flags (UI toggles, cached hints) that are cheap to
//! read and not security-sensitive. The file-backed variant persists every
//! write on a best-effort basis: a failed write is logged and the in-memory
//! value still applies for the rest of the process.

use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};
use tracing::{debug, warn};

/// Open file-backed preferences, one per path, while any handle is alive.
static OPEN_FILES: OnceLock<Mutex<HashMap<PathBuf, Weak<Preferences>>>> = OnceLock::new();

/// A string-keyed map of boolean flags.
pub struct Preferences {
    values: Mutex<BTreeMap<String, bool>>,
    path: Option<PathBuf>,
}

impl Preferences {
    /// Open the preference file at `path`.
    ///
    /// A missing file starts empty. An unreadable or malformed file is
    /// logged and also starts empty; it is overwritten on the next write.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, bool>>(&bytes) {
                Ok(values) => values,
                Err(e) => {
                    warn!(path = %path.display(), "discarding malformed preference file: {e}");
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(path = %path.display(), "could not read preference file: {e}");
                BTreeMap::new()
            }
        };

        Self {
            values: Mutex::new(values),
            path: Some(path),
        }
    }

    /// The process-wide preferences for `path`.
    ///
    /// Every caller asking for the same path while a handle is alive gets
    /// the same instance, so flags written through one are seen by all and
    /// no writer clobbers another's file. Once every handle is dropped the
    /// next call reads the file again.
    pub fn shared(path: impl Into<PathBuf>) -> Arc<Self> {
        let path = path.into();
        let mut open = OPEN_FILES.get_or_init(Default::default).lock();
        if let Some(prefs) = open.get(&path).and_then(Weak::upgrade) {
            return prefs;
        }

        open.retain(|_, prefs| prefs.strong_count() > 0);
        let prefs = Arc::new(Self::open(path.clone()));
        open.insert(path, Arc::downgrade(&prefs));
        prefs
    }

    /// Preferences that never touch disk.
    pub fn in_memory() -> Self {
        Self {
            values: Mutex::new(BTreeMap::new()),
            path: None,
        }
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Read a flag.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.values.lock().get(key).copied()
    }

    /// Set a flag and persist.
    pub fn set_bool(&self, key: &str, value: bool) {
        let mut values = self.values.lock();
        if values.insert(key.to_string(), value) == Some(value) {
            return;
        }
        self.persist(&values);
    }

    /// Remove a flag and persist.
    pub fn remove(&self, key: &str) {
        let mut values = self.values.lock();
        if values.remove(key).is_some() {
            self.persist(&values);
        }
    }

    /// All keys starting with `prefix`, sorted.
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.values
            .lock()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect()
    }

    fn persist(&self, values: &BTreeMap<String, bool>) {
        let Some(path) = &self.path else {
            return;
        };

        let data = match serde_json::to_vec_pretty(values) {
            Ok(data) => data,
            Err(e) => {
                warn!("could not serialize preferences: {e}");
                return;
            }
        };

        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), "could not create preference directory: {e}");
            }
        }

        match crate::fs::write_atomic(path, &data, None) {
            Ok(()) => debug!(path = %path.display(), "saved preferences"),
            Err(e) => warn!(path = %path.display(), "could not save preferences: {e}"),
        }
    }
}

impl std::fmt::Debug for Preferences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Preferences")
            .field("path", &self.path)
            .field("len", &self.values.lock().len())
            .finish()
    }
}
