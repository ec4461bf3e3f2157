//! Abstract key-value persistence.
//!
//! Everything the input system persists goes through a [`Store`] as JSON
//! values under a handful of well-known keys. Hosts pick the backend:
//! [`MemoryStore`] for tests and ephemeral sessions, [`JsonFileStore`] for a
//! directory of `<key>.json` files, or their own implementation.
//!
//! Stored data is not validated on write. A value that fails to decode is
//! logged and read back as missing, so a corrupt store degrades to lookup
//! misses instead of errors.

use crate::error::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Key holding the `Vec<ActionMap>`.
pub const ACTION_MAPS_KEY: &str = "action_mappings";
/// Key holding the `Vec<Player>`.
pub const PLAYERS_KEY: &str = "players";
/// Key holding the `Vec<KnownGamepad>`.
pub const KNOWN_GAMEPADS_KEY: &str = "gamepads";

/// Key holding the binding table of one gamepad layout.
pub fn gamepad_table_key(gpad_type: &str) -> String {
    format!("gamepad_table.{gpad_type}")
}

/// Minimal key-value store of JSON values.
pub trait Store {
    fn get(&self, key: &str) -> Option<Value>;

    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Decode the value under `key`, treating malformed data as missing.
pub fn load<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
    let value = store.get(key)?;
    match serde_json::from_value(value) {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::warn!(key, %err, "ignoring malformed stored value");
            None
        }
    }
}

/// Encode `value` and write it under `key`.
pub fn save<T: Serialize + ?Sized>(store: &mut dyn Store, key: &str, value: &T) -> Result<()> {
    let encoded = serde_json::to_value(value)?;
    store.set(key, encoded)?;
    tracing::debug!(key, "stored value");
    Ok(())
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// One pretty-printed JSON file per key inside a directory.
///
/// Characters outside `[A-Za-z0-9._-]` in a key are replaced by `_` to form
/// the file name.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Open (and create if needed) the store directory.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl Store for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let text = fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "stored file is not valid JSON");
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let text = serde_json::to_string_pretty(&value)?;
        fs::write(self.path_for(key), text)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
