//! One-call load/save functions for the built-in config types.
//!
//! Each function opens the file its config type maps to, runs the engine
//! with default [`LoadOptions`], and drops the store.  Use
//! [`ConfigSettings`] directly for custom config types or stricter options.

use std::path::Path;

use crate::application::config_settings::ConfigSettings;
use crate::application::engine::{load_settings, save_settings, LoadOptions, LoadOutcome, SettingsError};
use crate::domain::field::Settings;
use crate::domain::store::ConfigType;
use crate::infrastructure::config_types::{AppConfig, CustomConfig, WebConfig, XmlConfig};

/// A registry with all four built-in config types registered.
pub fn default_config_settings() -> ConfigSettings {
    let mut settings = ConfigSettings::new();
    settings.register_config_type(AppConfig);
    settings.register_config_type(WebConfig);
    settings.register_config_type(CustomConfig);
    settings.register_config_type(XmlConfig);
    settings
}

fn load_with<C: ConfigType, T: Settings>(
    config_type: C,
    target: &mut T,
    config_name: &str,
    path: &Path,
) -> Result<LoadOutcome, SettingsError> {
    let store = config_type.load_config(config_name, path)?;
    load_settings(target, &*store, &LoadOptions::default())
}

fn save_with<C: ConfigType, T: Settings>(
    config_type: C,
    source: &T,
    config_name: &str,
    path: &Path,
) -> Result<(), SettingsError> {
    let mut store = config_type.load_config(config_name, path)?;
    save_settings(source, &mut *store)
}

/// Loads `target` from the executable's own `.config` file.
///
/// # Errors
///
/// See [`load_settings`].
pub fn load_app_config<T: Settings>(target: &mut T) -> Result<LoadOutcome, SettingsError> {
    load_with(AppConfig, target, "", Path::new(""))
}

/// Saves `source` to the executable's own `.config` file.
///
/// # Errors
///
/// See [`save_settings`].
pub fn save_app_config<T: Settings>(source: &T) -> Result<(), SettingsError> {
    save_with(AppConfig, source, "", Path::new(""))
}

/// Loads `target` from `web.config` under `site_root` (cwd if empty).
///
/// # Errors
///
/// See [`load_settings`].
pub fn load_web_config<T: Settings>(
    target: &mut T,
    site_root: impl AsRef<Path>,
) -> Result<LoadOutcome, SettingsError> {
    load_with(WebConfig, target, "", site_root.as_ref())
}

/// Saves `source` to `web.config` under `site_root` (cwd if empty).
///
/// # Errors
///
/// See [`save_settings`].
pub fn save_web_config<T: Settings>(source: &T, site_root: impl AsRef<Path>) -> Result<(), SettingsError> {
    save_with(WebConfig, source, "", site_root.as_ref())
}

/// Loads `target` from `<path>/<config_name>.config`.
///
/// # Errors
///
/// See [`load_settings`].
pub fn load_config<T: Settings>(
    target: &mut T,
    config_name: &str,
    path: impl AsRef<Path>,
) -> Result<LoadOutcome, SettingsError> {
    load_with(CustomConfig, target, config_name, path.as_ref())
}

/// Saves `source` to `<path>/<config_name>.config`.
///
/// # Errors
///
/// See [`save_settings`].
pub fn save_config<T: Settings>(
    source: &T,
    config_name: &str,
    path: impl AsRef<Path>,
) -> Result<(), SettingsError> {
    save_with(CustomConfig, source, config_name, path.as_ref())
}

/// Loads `target` from `<path>/<config_name>.xml`.
///
/// # Errors
///
/// See [`load_settings`].
pub fn load_xml_config<T: Settings>(
    target: &mut T,
    config_name: &str,
    path: impl AsRef<Path>,
) -> Result<LoadOutcome, SettingsError> {
    load_with(XmlConfig, target, config_name, path.as_ref())
}

/// Saves `source` to `<path>/<config_name>.xml`.
///
/// # Errors
///
/// See [`save_settings`].
pub fn save_xml_config<T: Settings>(
    source: &T,
    config_name: &str,
    path: impl AsRef<Path>,
) -> Result<(), SettingsError> {
    save_with(XmlConfig, source, config_name, path.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_settings_registers_builtin_types() {
        let settings = default_config_settings();

        assert!(settings.is_registered::<AppConfig>());
        assert!(settings.is_registered::<WebConfig>());
        assert!(settings.is_registered::<CustomConfig>());
        assert!(settings.is_registered::<XmlConfig>());
    }
}
