//! Persisted version markers and the key-value store they live in.
//!
//! The store itself is owned by the hosting application; the gate only needs
//! string get/set. A flat JSON file implementation is provided for hosts
//! without their own persistence, plus an in-memory one for tests. Failed or
//! malformed reads degrade to "value absent" so the gate stays hidden rather
//! than acting on uncertain state.

use crate::paths;
use crate::version;
use parking_lot::RwLock;
use semver::Version;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Store key for the version the app is running right now.
pub const CURRENT_APP_VERSION: &str = "currentAppVersion";

/// Store key for the version recorded from the previous session.
pub const LAST_APP_VERSION: &str = "lastAppVersion";

/// Store key for the version at which the user dismissed the announcement.
pub const SEEN_ANNOUNCEMENT_VERSION: &str = "seenAnnouncementVersion";

/// Failure reading from or writing to the persisted key-value store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing file could not be read or written.
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The backing document could not be serialized or parsed.
    #[error("store document invalid: {0}")]
    Document(#[from] serde_json::Error),
}

/// Externally owned persisted key-value store.
///
/// Calls run on the session event loop; the host serializes triggering
/// events, so implementations only need read-your-writes within a session,
/// not cross-thread ordering.
pub trait MarkerStore {
    /// Read the value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the backing store cannot be read. Callers
    /// in this crate treat that the same as an absent value.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StoreError`] if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and hosts that persist markers elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl MarkerStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Marker store backed by a flat JSON document on disk.
///
/// A missing or unreadable file behaves as an empty store. Writes go through
/// to disk immediately.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, loading any existing document.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::load(&path) {
            Ok(entries) => {
                debug!("Loaded {} markers from {}", entries.len(), path.display());
                entries
            }
            Err(err) => {
                warn!(
                    "Treating marker store at {} as empty: {err}",
                    path.display()
                );
                HashMap::new()
            }
        };

        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    /// Default marker file location under the platform data directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        paths::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("noticeboard")
            .join("markers.json")
    }

    fn load(path: &Path) -> Result<HashMap<String, String>, StoreError> {
        if !path.exists() {
            return Ok(HashMap::new());
        }
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl MarkerStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.write();
            entries.insert(key.to_string(), value.to_string());
            self.persist(&entries)?;
        }
        debug!("Saved marker {key} to {}", self.path.display());
        Ok(())
    }
}

/// Read-only snapshot of the persisted markers, taken once per evaluation.
///
/// Every field is explicitly optional. A read failure or malformed value
/// degrades that field to `None` instead of aborting the evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSnapshot {
    /// Version the hosting application recorded at startup.
    pub current: Option<Version>,

    /// Version recorded from the previous session; unset on a fresh install.
    pub last: Option<Version>,

    /// Version at which the user last dismissed the announcement.
    pub seen: Option<Version>,
}

impl MarkerSnapshot {
    /// Read all three markers from `store`.
    #[must_use]
    pub fn read(store: &impl MarkerStore) -> Self {
        Self {
            current: read_marker(store, CURRENT_APP_VERSION),
            last: read_marker(store, LAST_APP_VERSION),
            seen: read_marker(store, SEEN_ANNOUNCEMENT_VERSION),
        }
    }
}

fn read_marker(store: &impl MarkerStore, key: &str) -> Option<Version> {
    match store.get(key) {
        Ok(value) => value.as_deref().and_then(version::parse_marker),
        Err(err) => {
            warn!("Treating marker {key} as unset after read failure: {err}");
            None
        }
    }
}

/// Record `current` as the running app version, rolling any different
/// previous value into `lastAppVersion`.
///
/// Called by the hosting application once at startup, before the gate
/// evaluates. Relaunching the same version changes nothing, so the upgrade
/// signal survives until the next actual version change. On a fresh install
/// there is no previous value and `lastAppVersion` stays unset.
///
/// # Errors
///
/// Returns a [`StoreError`] if the markers cannot be read or written.
pub fn record_session_version(
    store: &impl MarkerStore,
    current: &Version,
) -> Result<(), StoreError> {
    let rendered = current.to_string();
    let saved = store.get(CURRENT_APP_VERSION)?;

    if saved.as_deref() == Some(rendered.as_str()) {
        return Ok(());
    }

    if let Some(previous) = saved {
        store.set(LAST_APP_VERSION, &previous)?;
    }
    store.set(CURRENT_APP_VERSION, &rendered)
}
