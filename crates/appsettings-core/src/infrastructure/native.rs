//! Native structured configuration: a TOML `.config` file.
//!
//! Settings live in an `[appSettings]` table of string values:
//!
//! ```toml
//! [appSettings]
//! Name = "primary"
//! "Items[0]" = "a"
//! "Items[1]" = "b"
//!
//! [logging]        # any other table is kept as-is
//! level = "info"
//! ```
//!
//! Integer, float, boolean and datetime values in `[appSettings]` are read
//! as their TOML text.  Everything outside `[appSettings]` is carried through
//! a save unchanged.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{debug, info};

use crate::domain::store::{SettingsStore, StoreError};

/// Name of the settings table.
pub const APP_SETTINGS_TABLE: &str = "appSettings";

/// An opened `.config` file.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeConfiguration {
    path: PathBuf,
    entries: Vec<(String, String)>,
    other: Table,
}

impl NativeConfiguration {
    /// An empty configuration that will be written to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
            other: Table::new(),
        }
    }

    /// Opens the file at `path`, or starts empty if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] for file-system errors other than "not
    /// found", [`StoreError::TomlParse`] if the TOML is malformed, and
    /// [`StoreError::Malformed`] if `appSettings` holds nested tables or arrays.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found, starting empty");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut other: Table = match toml::from_str(&content) {
            Ok(table) => table,
            Err(source) => return Err(StoreError::TomlParse { path, source }),
        };

        let entries = match other.remove(APP_SETTINGS_TABLE) {
            None => Vec::new(),
            Some(Value::Table(table)) => {
                let mut entries = Vec::with_capacity(table.len());
                for (key, value) in table {
                    let value = value_text(value).ok_or_else(|| StoreError::Malformed {
                        path: path.clone(),
                        reason: format!("value of `{key}` must be a string, number, boolean or datetime"),
                    })?;
                    entries.push((key, value));
                }
                entries
            }
            Some(_) => {
                return Err(StoreError::Malformed {
                    path,
                    reason: format!("`{APP_SETTINGS_TABLE}` must be a table"),
                })
            }
        };

        Ok(Self { path, entries, other })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Settings entries in file order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// Serializes the whole file, `[appSettings]` included.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TomlSerialize`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String, StoreError> {
        let mut settings = Table::new();
        for (key, value) in &self.entries {
            settings.insert(key.clone(), Value::String(value.clone()));
        }
        let mut file = self.other.clone();
        file.insert(APP_SETTINGS_TABLE.to_string(), Value::Table(settings));
        Ok(toml::to_string_pretty(&file)?)
    }
}

fn value_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Integer(i) => Some(i.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(d) => Some(d.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

impl SettingsStore for NativeConfiguration {
    fn get(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn all_keys(&self) -> Vec<String> {
        self.entries.iter().map(|(k, _)| k.clone()).collect()
    }

    fn add(&mut self, key: &str, value: &str) {
        if self.entries.iter().all(|(k, _)| k != key) {
            self.entries.push((key.to_string(), value.to_string()));
        }
    }

    fn remove(&mut self, key: &str) {
        self.entries.retain(|(k, _)| k != key);
    }

    fn remove_by_prefix(&mut self, prefix: &str) {
        self.entries.retain(|(k, _)| !k.contains(prefix));
    }

    fn save(&mut self) -> Result<(), StoreError> {
        let content = self.to_toml_string()?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(&self.path, content).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        info!(path = %self.path.display(), settings = self.entries.len(), "config written");
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
