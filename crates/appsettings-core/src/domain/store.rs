//! Store and backend traits.
//!
//! [`SettingsStore`] is the uniform view over one opened `appSettings`
//! section.  The engine only ever talks to this trait; the TOML `.config`
//! store, the XML document and the in-memory store each implement it.
//!
//! [`ConfigType`] opens a store for a logical configuration name and
//! directory.  [`crate::ConfigSettings`] keeps a registry of config types and
//! resolves one per load/save call.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error type for opening or persisting a settings store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing settings at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The XML document could not be parsed.
    #[error("failed to parse XML settings at {path}: {reason}")]
    XmlParse { path: PathBuf, reason: String },

    /// The XML document could not be written.
    #[error("failed to write XML settings to {path}: {reason}")]
    XmlWrite { path: PathBuf, reason: String },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML at {path}: {source}")]
    TomlParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The `appSettings` section holds something other than key/value strings.
    #[error("malformed appSettings section in {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// A flat key/value `appSettings` section.
///
/// Keys are unique within a section; [`add`](Self::add) never overwrites.
#[cfg_attr(test, mockall::automock)]
pub trait SettingsStore {
    /// Exact key lookup.
    fn get(&self, key: &str) -> Option<String>;

    /// Every key currently in the section, in no particular order.
    fn all_keys(&self) -> Vec<String>;

    /// Inserts an entry.  Does nothing if `key` already exists.
    fn add(&mut self, key: &str, value: &str);

    /// Deletes the entry with exactly this key, if any.
    fn remove(&mut self, key: &str);

    /// Deletes every entry whose key **contains** `prefix`.
    ///
    /// This is a substring match, not a true prefix match: removing `"Items"`
    /// also removes `OtherItems[0]`.  Array saves rely on it to clear every
    /// previously stored index of a property.
    fn remove_by_prefix(&mut self, prefix: &str);

    /// Persists the section to its physical medium.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backing file cannot be written.
    fn save(&mut self) -> Result<(), StoreError>;
}

impl<S: SettingsStore + ?Sized> SettingsStore for Box<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn all_keys(&self) -> Vec<String> {
        (**self).all_keys()
    }

    fn add(&mut self, key: &str, value: &str) {
        (**self).add(key, value);
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key);
    }

    fn remove_by_prefix(&mut self, prefix: &str) {
        (**self).remove_by_prefix(prefix);
    }

    fn save(&mut self) -> Result<(), StoreError> {
        (**self).save()
    }
}

/// Opens the settings store for one kind of configuration file.
///
/// Implementations are registered with [`crate::ConfigSettings`] and looked
/// up by their concrete type.  A fresh store is opened for every call.
pub trait ConfigType: 'static {
    /// Opens the store for `config_name` under `path`.
    ///
    /// Config types that have a fixed location (the executable's own config,
    /// a site's `web.config`) may ignore either argument.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the underlying file exists but cannot be read
    /// or parsed.
    fn load_config(
        &self,
        config_name: &str,
        path: &Path,
    ) -> Result<Box<dyn SettingsStore>, StoreError>;
}
