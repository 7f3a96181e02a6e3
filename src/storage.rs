use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Context as _;

use crate::theme::Theme;

pub const DEFAULT_THEME_KEY: &str = "glasscase-theme";

/// Client-local key/value storage.
pub trait PreferenceBackend {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

/// Session-only storage; forgotten when the page goes away.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RefCell<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceBackend for MemoryStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat JSON object on disk, read on every access so concurrent pages see each other's writes.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> anyhow::Result<BTreeMap<String, String>> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .with_context(|| format!("parse storage {}", self.path.display())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e).with_context(|| format!("read storage {}", self.path.display())),
        }
    }
}

impl PreferenceBackend for JsonFileStorage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        let json = serde_json::to_vec_pretty(&entries).context("serialize storage")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("write storage {}", self.path.display()))
    }
}

/// Storage that refuses every access, like local storage under a strict privacy mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableStorage;

impl PreferenceBackend for UnavailableStorage {
    fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("storage is unavailable")
    }

    fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage is unavailable")
    }
}

/// The single persisted theme preference. Never fails; a broken backend only costs persistence.
pub struct PreferenceStore {
    backend: Box<dyn PreferenceBackend>,
    key: String,
}

impl PreferenceStore {
    pub fn new(backend: Box<dyn PreferenceBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStorage::new()), DEFAULT_THEME_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn get(&self) -> Option<Theme> {
        let raw = match self.backend.get(&self.key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::debug!(key = %self.key, error = %format!("{e:#}"), "theme preference unreadable");
                return None;
            }
        };
        match raw.parse() {
            Ok(theme) => Some(theme),
            Err(_) => {
                tracing::debug!(key = %self.key, value = %raw, "ignoring unknown stored theme");
                None
            }
        }
    }

    pub fn set(&self, theme: Theme) -> bool {
        match self.backend.set(&self.key, theme.as_str()) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(key = %self.key, %theme, error = %format!("{e:#}"), "theme preference not persisted");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_round_trip() {
        let store = PreferenceStore::in_memory();
        assert_eq!(store.get(), None);
        assert!(store.set(Theme::Light));
        assert_eq!(store.get(), Some(Theme::Light));
        assert!(store.set(Theme::Dark));
        assert_eq!(store.get(), Some(Theme::Dark));
    }

    #[test]
    fn unavailable_backend_is_swallowed() {
        let store = PreferenceStore::new(Box::new(UnavailableStorage), DEFAULT_THEME_KEY);
        assert_eq!(store.get(), None);
        assert!(!store.set(Theme::Light));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn unknown_value_reads_as_absent() {
        let backend = MemoryStorage::new();
        backend.set(DEFAULT_THEME_KEY, "sepia").unwrap();
        let store = PreferenceStore::new(Box::new(backend), DEFAULT_THEME_KEY);
        assert_eq!(store.get(), None);
    }

    #[test]
    fn json_file_persists_and_keeps_other_keys() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        std::fs::write(&path, r#"{"other":"value"}"#).unwrap();

        let store = PreferenceStore::new(Box::new(JsonFileStorage::new(&path)), "glasscase-theme");
        assert_eq!(store.get(), None);
        assert!(store.set(Theme::Light));

        let reopened = PreferenceStore::new(Box::new(JsonFileStorage::new(&path)), "glasscase-theme");
        assert_eq!(reopened.get(), Some(Theme::Light));

        let raw: BTreeMap<String, String> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw.get("other").map(String::as_str), Some("value"));
    }

    #[test]
    fn corrupt_json_file_degrades() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("storage.json");
        std::fs::write(&path, "not json").unwrap();
        let store = PreferenceStore::new(Box::new(JsonFileStorage::new(&path)), DEFAULT_THEME_KEY);
        assert_eq!(store.get(), None);
        assert!(!store.set(Theme::Dark));
    }
}
