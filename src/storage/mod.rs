//! # Configuration File Store
//!
//! A single JSON object keyed by section name. Every read loads the whole
//! file; every write loads, replaces one section and stores the whole file
//! back. Concurrent writers are not supported.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::{HarnessError, Result};

pub const CONFIG_FILE: &str = "configuration.txt";
pub const DEFAULT_SECTION: &str = "config_test";

#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Opens `<dir>/configuration.txt`, see [`ConfigStore::open`].
    pub fn in_dir(dir: &Path) -> Result<Self> {
        Self::open(dir.join(CONFIG_FILE))
    }

    /// Opens the store, seeding it with the example section when the file
    /// does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        if !store.path.exists() {
            let mut sections = Map::new();
            sections.insert(
                DEFAULT_SECTION.to_string(),
                json!({"config1": "c1", "config2": "c2"}),
            );
            store.save(&sections)?;
            info!(path = %store.path.display(), "created configuration file");
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the section, or `None` when it was never written.
    pub fn get(&self, section: &str) -> Result<Option<Value>> {
        Ok(self.load()?.remove(section))
    }

    /// Replaces (or adds) one section, leaving the others untouched.
    pub fn put(&self, section: &str, value: Value) -> Result<()> {
        let mut sections = self.load()?;
        sections.insert(section.to_string(), value);
        self.save(&sections)
    }

    fn load(&self) -> Result<Map<String, Value>> {
        let raw = fs::read_to_string(&self.path).map_err(|e| HarnessError::io(&self.path, e))?;
        serde_json::from_str(&raw).map_err(|source| HarnessError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, sections: &Map<String, Value>) -> Result<()> {
        let raw = to_pretty_json(sections).map_err(|source| HarnessError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, raw).map_err(|e| HarnessError::io(&self.path, e))
    }
}

/// Pretty JSON with a four-space indent.
fn to_pretty_json(value: &Map<String, Value>) -> serde_json::Result<String> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    serde::Serialize::serialize(value, &mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_open_seeds_default_section() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path()).unwrap();

        assert_eq!(
            store.get(DEFAULT_SECTION).unwrap(),
            Some(json!({"config1": "c1", "config2": "c2"}))
        );
        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("\n    \"config_test\""), "four-space indent: {raw}");
    }

    #[test]
    fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path()).unwrap();
        let pool = json!({"name": "rbd", "pg_num": 32, "tags": ["a", "b"]});

        store.put("pool", pool.clone()).unwrap();

        assert_eq!(store.get("pool").unwrap(), Some(pool));
    }

    #[test]
    fn writing_one_section_keeps_others() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path()).unwrap();

        store.put("a", json!({"x": 1})).unwrap();
        store.put("b", json!({"y": 2})).unwrap();

        assert_eq!(store.get("a").unwrap(), Some(json!({"x": 1})));
        assert_eq!(store.get("b").unwrap(), Some(json!({"y": 2})));
        assert!(store.get(DEFAULT_SECTION).unwrap().is_some());
    }

    #[test]
    fn unknown_section_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::in_dir(dir.path()).unwrap();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn existing_file_is_not_reseeded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"only": {"k": "v"}}"#).unwrap();

        let store = ConfigStore::open(&path).unwrap();

        assert_eq!(store.get(DEFAULT_SECTION).unwrap(), None);
        assert_eq!(store.get("only").unwrap(), Some(json!({"k": "v"})));
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();

        let store = ConfigStore::open(&path).unwrap();

        assert!(matches!(store.get("x"), Err(HarnessError::Json { .. })));
    }
}
