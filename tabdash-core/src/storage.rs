// tabdash-core/src/storage.rs
use crate::settings::UserSettings;
use std::cell::{Cell, RefCell};
use std::path::{Path, PathBuf};

/// Key the settings document is stored under
pub const SETTINGS_KEY: &str = "user_settings";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Data directory not found")]
    NoDataDir,
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable home of the settings document. Reads and writes are whole-document.
pub trait SettingsStorage {
    /// `Ok(None)` when nothing has been stored yet
    fn read(&self) -> Result<Option<UserSettings>, StorageError>;

    fn write(&self, settings: &UserSettings) -> Result<(), StorageError>;
}

/// JSON file holding `{ "user_settings": <document> }`
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<data_dir>/tabdash/settings.json`
    pub fn default_path() -> Result<PathBuf, StorageError> {
        Ok(dirs::data_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("tabdash/settings.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStorage for JsonFileStorage {
    fn read(&self) -> Result<Option<UserSettings>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&self.path)?;
        let mut root: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)?;

        match root.remove(SETTINGS_KEY) {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    fn write(&self, settings: &UserSettings) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut root = serde_json::Map::new();
        root.insert(SETTINGS_KEY.to_string(), serde_json::to_value(settings)?);
        let content = serde_json::to_string_pretty(&root)?;

        // Write-then-rename so a crash mid-write never leaves half a document
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }
}

/// In-process storage for tests and `--ephemeral` sessions
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RefCell<Option<UserSettings>>,
    writes: Cell<usize>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(settings: UserSettings) -> Self {
        let storage = Self::default();
        storage.document.replace(Some(settings));
        storage
    }

    /// Number of successful writes so far
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    pub fn document(&self) -> Option<UserSettings> {
        self.document.borrow().clone()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }
}

impl SettingsStorage for MemoryStorage {
    fn read(&self) -> Result<Option<UserSettings>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Unavailable("read failure injected".into()));
        }
        Ok(self.document.borrow().clone())
    }

    fn write(&self, settings: &UserSettings) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Unavailable("write failure injected".into()));
        }
        self.document.replace(Some(settings.clone()));
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl<T: SettingsStorage + ?Sized> SettingsStorage for &T {
    fn read(&self) -> Result<Option<UserSettings>, StorageError> {
        (**self).read()
    }

    fn write(&self, settings: &UserSettings) -> Result<(), StorageError> {
        (**self).write(settings)
    }
}

impl<T: SettingsStorage + ?Sized> SettingsStorage for Box<T> {
    fn read(&self) -> Result<Option<UserSettings>, StorageError> {
        (**self).read()
    }

    fn write(&self, settings: &UserSettings) -> Result<(), StorageError> {
        (**self).write(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{ThemeMode, WidgetInstance};

    #[test]
    fn test_file_storage_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("settings.json"));
        assert!(storage.read().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested/settings.json"));

        let settings = UserSettings {
            theme: ThemeMode::Info,
            widgets: vec![WidgetInstance::new("quote-1", "quote", true)],
            ..UserSettings::default()
        };
        storage.write(&settings).unwrap();

        let raw = std::fs::read_to_string(storage.path()).unwrap();
        let root: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(root[SETTINGS_KEY]["theme"], "info");

        assert_eq!(storage.read().unwrap(), Some(settings));
        assert!(!dir.path().join("nested/settings.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_without_key_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"wallpaper_cache": {}}"#).unwrap();

        assert!(JsonFileStorage::new(path).read().unwrap().is_none());
    }

    #[test]
    fn test_file_storage_corrupt_document_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonFileStorage::new(path).read(),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn test_memory_storage_failure_injection() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        assert!(storage.write(&UserSettings::default()).is_err());
        assert_eq!(storage.writes(), 0);

        storage.set_fail_writes(false);
        storage.write(&UserSettings::default()).unwrap();
        assert_eq!(storage.writes(), 1);

        storage.set_fail_reads(true);
        assert!(storage.read().is_err());
    }
}
