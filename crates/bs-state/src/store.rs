//! Keyed numeric storage for persistent player state

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use bs_core::{BsError, BsResult};

/// Key of the persisted balance record
pub const PLAYER_BALANCE_KEY: &str = "PlayerBalance";

/// Durable key → number storage
///
/// Takes `&self` so one store can be shared between the engine and whoever
/// tears the session down.
pub trait BalanceStore: Send + Sync {
    fn load(&self, key: &str) -> BsResult<Option<f64>>;
    fn save(&self, key: &str, value: f64) -> BsResult<()>;
}

impl<S: BalanceStore + ?Sized> BalanceStore for Arc<S> {
    fn load(&self, key: &str) -> BsResult<Option<f64>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: f64) -> BsResult<()> {
        (**self).save(key, value)
    }
}

/// In-memory store; clones share the same records
#[derive(Debug, Clone, Default)]
pub struct MemoryBalanceStore {
    records: Arc<Mutex<BTreeMap<String, f64>>>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a balance
    pub fn with_balance(balance: f64) -> Self {
        let store = Self::new();
        store
            .records
            .lock()
            .insert(PLAYER_BALANCE_KEY.to_string(), balance);
        store
    }

    /// Current persisted balance, if any
    pub fn balance(&self) -> Option<f64> {
        self.records.lock().get(PLAYER_BALANCE_KEY).copied()
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn load(&self, key: &str) -> BsResult<Option<f64>> {
        Ok(self.records.lock().get(key).copied())
    }

    fn save(&self, key: &str, value: f64) -> BsResult<()> {
        self.records.lock().insert(key.to_string(), value);
        Ok(())
    }
}

/// Flat JSON document of records on disk
///
/// ```json
/// { "PlayerBalance": 1000.0 }
/// ```
#[derive(Debug, Clone)]
pub struct JsonBalanceStore {
    path: PathBuf,
}

impl JsonBalanceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the platform default location
    pub fn at_default_path() -> Self {
        Self::new(Self::default_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get default store file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("BitSlot"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("player.json")
    }

    fn read_records(&self) -> BsResult<BTreeMap<String, f64>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| BsError::Serialization(format!("{}: {}", self.path.display(), e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl BalanceStore for JsonBalanceStore {
    fn load(&self, key: &str) -> BsResult<Option<f64>> {
        Ok(self.read_records()?.get(key).copied())
    }

    fn save(&self, key: &str, value: f64) -> BsResult<()> {
        // A corrupt document is replaced; a file that cannot be read is left alone
        let mut records = match self.read_records() {
            Ok(records) => records,
            Err(BsError::Serialization(e)) => {
                log::warn!("Discarding corrupt balance store: {}", e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        records.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(&records)
            .map_err(|e| BsError::Serialization(e.to_string()))?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_clones_share_records() {
        let store = MemoryBalanceStore::new();
        let handle = store.clone();

        store.save(PLAYER_BALANCE_KEY, 42.5).unwrap();
        assert_eq!(handle.balance(), Some(42.5));
        assert_eq!(handle.load("Missing").unwrap(), None);
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonBalanceStore::new(dir.path().join("nested").join("player.json"));

        assert_eq!(store.load(PLAYER_BALANCE_KEY).unwrap(), None);

        store.save(PLAYER_BALANCE_KEY, 1250.0).unwrap();
        store.save("Other", 1.0).unwrap();

        let reopened = JsonBalanceStore::new(store.path());
        assert_eq!(reopened.load(PLAYER_BALANCE_KEY).unwrap(), Some(1250.0));
        assert_eq!(reopened.load("Other").unwrap(), Some(1.0));
    }

    #[test]
    fn test_json_store_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        fs::write(&path, "not json").unwrap();

        let store = JsonBalanceStore::new(&path);
        assert!(matches!(
            store.load(PLAYER_BALANCE_KEY),
            Err(BsError::Serialization(_))
        ));

        // Saving overwrites the broken document
        store.save(PLAYER_BALANCE_KEY, 10.0).unwrap();
        assert_eq!(store.load(PLAYER_BALANCE_KEY).unwrap(), Some(10.0));
    }

    #[test]
    fn test_json_store_read_failure_keeps_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.json");
        // Not UTF-8: the read itself fails, the document is not just malformed
        let bytes = [0xff, 0xfe, 0x00, 0x7b];
        fs::write(&path, bytes).unwrap();

        let store = JsonBalanceStore::new(&path);
        assert!(matches!(
            store.save(PLAYER_BALANCE_KEY, 10.0),
            Err(BsError::Io(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}
