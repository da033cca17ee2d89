//! Built-in config types.
//!
//! | Type           | File                                 | Backend |
//! |----------------|--------------------------------------|---------|
//! | [`AppConfig`]  | `<current executable>.config`        | TOML    |
//! | [`WebConfig`]  | `<path>/web.config` (cwd if empty)   | TOML    |
//! | [`CustomConfig`] | `<path>/<name>.config`             | TOML    |
//! | [`XmlConfig`]  | `<path>/<name>.xml`                  | XML     |
//!
//! A file that does not exist opens as an empty section and is created on
//! the first save.

use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::native::NativeConfiguration;
use super::xml::XmlConfiguration;
use crate::domain::store::{ConfigType, SettingsStore, StoreError};

/// Extension used by the TOML config types.
pub const CONFIG_EXTENSION: &str = ".config";
/// Extension used by [`XmlConfig`].
pub const XML_EXTENSION: &str = ".xml";

/// The running executable's own config file, e.g. `server.exe.config`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppConfig;

impl AppConfig {
    /// Path of the executable's config file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the executable path is unavailable.
    pub fn file_path() -> Result<PathBuf, StoreError> {
        let exe = env::current_exe().map_err(|source| StoreError::Io {
            path: PathBuf::from("<current executable>"),
            source,
        })?;
        let mut file: OsString = exe.into_os_string();
        file.push(CONFIG_EXTENSION);
        Ok(PathBuf::from(file))
    }
}

impl ConfigType for AppConfig {
    fn load_config(&self, _config_name: &str, _path: &Path) -> Result<Box<dyn SettingsStore>, StoreError> {
        Ok(Box::new(NativeConfiguration::open(Self::file_path()?)?))
    }
}

/// A site's `web.config`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebConfig;

impl WebConfig {
    /// `web.config` under `site_root`, or under the current directory when
    /// `site_root` is empty.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the current directory is unavailable.
    pub fn file_path(site_root: &Path) -> Result<PathBuf, StoreError> {
        let root = if site_root.as_os_str().is_empty() {
            env::current_dir().map_err(|source| StoreError::Io {
                path: PathBuf::from("."),
                source,
            })?
        } else {
            site_root.to_path_buf()
        };
        Ok(root.join("web.config"))
    }
}

impl ConfigType for WebConfig {
    fn load_config(&self, _config_name: &str, path: &Path) -> Result<Box<dyn SettingsStore>, StoreError> {
        Ok(Box::new(NativeConfiguration::open(Self::file_path(path)?)?))
    }
}

/// A named `.config` file in a chosen directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomConfig;

impl CustomConfig {
    pub fn file_path(config_name: &str, path: &Path) -> PathBuf {
        path.join(format!("{config_name}{CONFIG_EXTENSION}"))
    }
}

impl ConfigType for CustomConfig {
    fn load_config(&self, config_name: &str, path: &Path) -> Result<Box<dyn SettingsStore>, StoreError> {
        Ok(Box::new(NativeConfiguration::open(Self::file_path(config_name, path))?))
    }
}

/// A named `.xml` document in a chosen directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlConfig;

impl XmlConfig {
    pub fn file_path(config_name: &str, path: &Path) -> PathBuf {
        path.join(format!("{config_name}{XML_EXTENSION}"))
    }
}

impl ConfigType for XmlConfig {
    fn load_config(&self, config_name: &str, path: &Path) -> Result<Box<dyn SettingsStore>, StoreError> {
        Ok(Box::new(XmlConfiguration::open(Self::file_path(config_name, path))?))
    }
}

/// `true` if `path` contains a regular file named `name` + `extension`.
///
/// `extension` includes the leading dot, e.g. `".xml"`.  An unreadable or
/// missing directory counts as "does not exist".
pub fn config_exists(path: impl AsRef<Path>, name: &str, extension: &str) -> bool {
    let wanted = format!("{name}{extension}");
    let Ok(entries) = fs::read_dir(path.as_ref()) else {
        return false;
    };
    entries
        .filter_map(Result::ok)
        .any(|entry| entry.file_name() == wanted.as_str() && entry.path().is_file())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
