//! Grouped key-value settings persisted as a JSON file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::songinfo::types::SongInfoError;

#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq)]
pub struct SettingsStore {
    // Key: group name, Value: key -> value within that group
    groups: BTreeMap<String, BTreeMap<String, Value>>,
    #[serde(skip)]
    path: Option<PathBuf>,
}

impl SettingsStore {
    /// In-memory store that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Load the store from `path`. A missing file gives an empty store bound
    /// to that path; an unreadable one is logged and treated the same way.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match Self::load_inner(path) {
            Ok(mut store) => {
                store.path = Some(path.to_path_buf());
                store
            }
            Err(SongInfoError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No settings file yet");
                Self::with_path(path)
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to load settings, using defaults"
                );
                Self::with_path(path)
            }
        }
    }

    fn with_path(path: &Path) -> Self {
        Self {
            path: Some(path.to_path_buf()),
            ..Default::default()
        }
    }

    fn load_inner(path: &Path) -> Result<Self, SongInfoError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let store = serde_json::from_reader(reader)?;
        Ok(store)
    }

    pub fn save(&self) -> Result<(), SongInfoError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn value(&self, group: &str, key: &str) -> Option<&Value> {
        self.groups.get(group).and_then(|g| g.get(key))
    }

    pub fn set_value(&mut self, group: &str, key: &str, value: Value) {
        self.groups
            .entry(group.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn remove(&mut self, group: &str, key: &str) -> Option<Value> {
        let group_map = self.groups.get_mut(group)?;
        let removed = group_map.remove(key);
        if group_map.is_empty() {
            self.groups.remove(group);
        }
        removed
    }
}

/// The song info view's slice of the settings store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongInfoSettings {
    pub search_order: Option<Vec<String>>,
}

impl SongInfoSettings {
    pub const GROUP: &'static str = "SongInfo";
    pub const SEARCH_ORDER_KEY: &'static str = "search_order";

    /// Anything other than a list of strings reads as "not set".
    pub fn from_store(store: &SettingsStore) -> Self {
        let search_order = store
            .value(Self::GROUP, Self::SEARCH_ORDER_KEY)
            .and_then(|v| serde_json::from_value::<Vec<String>>(v.clone()).ok());
        Self { search_order }
    }

    pub fn store_search_order(order: Option<&[String]>, store: &mut SettingsStore) {
        match order {
            Some(order) => store.set_value(Self::GROUP, Self::SEARCH_ORDER_KEY, Value::from(order.to_vec())),
            None => {
                store.remove(Self::GROUP, Self::SEARCH_ORDER_KEY);
            }
        }
    }
}
