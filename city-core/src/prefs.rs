//! Durable key-value storage the city store is backed by.
//!
//! A namespace is a flat table of string keys to string values. The file
//! implementation keeps one TOML file per namespace:
//!
//! ```toml
//! city = "Tokyo, Japan"
//! ```

use directories::ProjectDirs;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::error::PrefsError;

/// Get-string / put-string access to one preferences namespace.
pub trait Preferences: Send + Sync + Debug {
    fn get_string(&self, key: &str) -> Option<String>;

    fn put_string(&self, key: &str, value: &str) -> Result<(), PrefsError>;
}

impl<P: Preferences + ?Sized> Preferences for Arc<P> {
    fn get_string(&self, key: &str) -> Option<String> {
        (**self).get_string(key)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        (**self).put_string(key, value)
    }
}

/// Process-local preferences; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `key` already holding `value`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let prefs = Self::new();
        prefs.values.lock().insert(key.to_string(), value.to_string());
        prefs
    }
}

impl Preferences for MemoryPreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// On-disk contents of one namespace file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Namespace {
    values: BTreeMap<String, String>,
}

/// Preferences persisted as `<dir>/<namespace>.toml`.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    namespace: Mutex<Namespace>,
}

impl FilePreferences {
    /// Open a namespace under `dir`. A missing file is an empty namespace.
    pub fn open(dir: impl AsRef<Path>, namespace: &str) -> Result<Self, PrefsError> {
        let path = Self::file_path(dir.as_ref(), namespace);
        let namespace = Self::load(&path)?;

        tracing::debug!(
            path = %path.display(),
            entries = namespace.values.len(),
            "opened preferences"
        );

        Ok(Self { path, namespace: Mutex::new(namespace) })
    }

    /// Open a namespace in the platform config directory.
    pub fn open_default(namespace: &str) -> Result<Self, PrefsError> {
        Self::open(default_dir()?, namespace)
    }

    pub fn file_path(dir: &Path, namespace: &str) -> PathBuf {
        dir.join(format!("{namespace}.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> Result<Namespace, PrefsError> {
        if !path.exists() {
            // First run: nothing stored yet.
            return Ok(Namespace::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|source| PrefsError::Read { path: path.to_path_buf(), source })?;

        toml::from_str(&contents)
            .map_err(|source| PrefsError::Parse { path: path.to_path_buf(), source })
    }

    fn save(&self, namespace: &Namespace) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|source| PrefsError::Write { path: parent.to_path_buf(), source })?;
        }

        let toml = toml::to_string_pretty(namespace)?;

        fs::write(&self.path, toml)
            .map_err(|source| PrefsError::Write { path: self.path.clone(), source })
    }
}

impl Preferences for FilePreferences {
    fn get_string(&self, key: &str) -> Option<String> {
        self.namespace.lock().values.get(key).cloned()
    }

    fn put_string(&self, key: &str, value: &str) -> Result<(), PrefsError> {
        // Held across the write so concurrent puts hit the disk in order.
        let mut namespace = self.namespace.lock();
        namespace.values.insert(key.to_string(), value.to_string());
        self.save(&namespace)
    }
}

/// Platform config directory for the weather app.
pub fn default_dir() -> Result<PathBuf, PrefsError> {
    let dirs =
        ProjectDirs::from("dev", "weather-app", "weather-city").ok_or(PrefsError::NoConfigDir)?;

    Ok(dirs.config_dir().to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_preferences_seeded_value() {
        let prefs = MemoryPreferences::with_value("city", "Oslo, Norway");
        assert_eq!(prefs.get_string("city").as_deref(), Some("Oslo, Norway"));
        assert_eq!(prefs.get_string("other"), None);
    }

    #[test]
    fn missing_file_is_empty_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = FilePreferences::open(dir.path(), "weather_current_city").unwrap();

        assert_eq!(prefs.get_string("city"), None);
        assert!(!prefs.path().exists());
    }

    #[test]
    fn put_creates_directories_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        let prefs = FilePreferences::open(&nested, "weather_current_city").unwrap();
        prefs.put_string("city", "Lima, Peru").unwrap();
        assert!(nested.join("weather_current_city.toml").exists());

        let reopened = FilePreferences::open(&nested, "weather_current_city").unwrap();
        assert_eq!(reopened.get_string("city").as_deref(), Some("Lima, Peru"));
    }

    #[test]
    fn file_is_flat_toml_table() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = FilePreferences::open(dir.path(), "ns").unwrap();
        prefs.put_string("city", "Tokyo, Japan").unwrap();

        let contents = fs::read_to_string(dir.path().join("ns.toml")).unwrap();
        assert_eq!(contents.trim(), r#"city = "Tokyo, Japan""#);
    }

    #[test]
    fn existing_keys_are_kept_on_write() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ns.toml"), "units = \"metric\"\n").unwrap();

        let prefs = FilePreferences::open(dir.path(), "ns").unwrap();
        prefs.put_string("city", "Tokyo, Japan").unwrap();

        let contents = fs::read_to_string(dir.path().join("ns.toml")).unwrap();
        let namespace: Namespace = toml::from_str(&contents).unwrap();
        assert_eq!(namespace.values.get("units").map(String::as_str), Some("metric"));
        assert_eq!(namespace.values.get("city").map(String::as_str), Some("Tokyo, Japan"));
    }

    #[test]
    fn non_string_value_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ns.toml"), "city = 42\n").unwrap();

        let err = FilePreferences::open(dir.path(), "ns").unwrap_err();
        assert!(matches!(err, PrefsError::Parse { .. }));
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("ns.toml"), "city = [not toml").unwrap();

        let err = FilePreferences::open(dir.path(), "ns").unwrap_err();
        assert!(matches!(err, PrefsError::Parse { .. }));
        assert!(err.to_string().contains("Failed to parse preferences file"));
    }

    #[test]
    fn namespaces_do_not_share_files() {
        let dir = tempfile::tempdir().unwrap();
        let a = FilePreferences::open(dir.path(), "a").unwrap();
        let b = FilePreferences::open(dir.path(), "b").unwrap();

        a.put_string("city", "Rome, Italy").unwrap();

        let b_reopened = FilePreferences::open(dir.path(), "b").unwrap();
        assert_eq!(b.get_string("city"), None);
        assert_eq!(b_reopened.get_string("city"), None);
    }
}
