//! Config type registry.
//!
//! [`ConfigSettings`] associates each registered [`ConfigType`] with its Rust
//! type.  A load or save names the config type as a type parameter; the
//! registry opens a fresh store through it, runs the engine, and drops the
//! store before returning.
//!
//! ```rust
//! use appsettings_core::{ConfigSettings, Settings, XmlConfig};
//!
//! #[derive(Default, Settings)]
//! struct Ui {
//!     #[setting(rename = "Theme")]
//!     theme: String,
//! }
//!
//! let mut settings = ConfigSettings::new();
//! settings.register_config_type(XmlConfig);
//!
//! let dir = std::env::temp_dir();
//! let mut ui = Ui::default();
//! // A missing file loads as an empty section: `theme` keeps its default.
//! settings.load::<XmlConfig, _>(&mut ui, "appsettings-doc-missing", &dir).unwrap();
//! assert_eq!(ui.theme, "");
//! ```

use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use super::engine::{load_settings, save_settings, LoadOptions, LoadOutcome, SettingsError};
use crate::domain::field::Settings;
use crate::domain::store::{ConfigType, SettingsStore};

/// Registry of config types plus the options used for every load.
#[derive(Default)]
pub struct ConfigSettings {
    config_types: HashMap<TypeId, Box<dyn ConfigType>>,
    options: LoadOptions,
}

impl fmt::Debug for ConfigSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigSettings")
            .field("registered", &self.config_types.len())
            .field("options", &self.options)
            .finish()
    }
}

impl ConfigSettings {
    /// Creates an empty registry with default load options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry with the given load options.
    pub fn with_options(options: LoadOptions) -> Self {
        Self {
            config_types: HashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Registers `config_type`, replacing any earlier instance of the same type.
    pub fn register_config_type<C: ConfigType>(&mut self, config_type: C) {
        debug!(config_type = type_name::<C>(), "registering config type");
        self.config_types
            .insert(TypeId::of::<C>(), Box::new(config_type));
    }

    /// Removes every registered config type.
    pub fn clear_config_types(&mut self) {
        self.config_types.clear();
    }

    /// `true` if a config type `C` is registered.
    pub fn is_registered<C: ConfigType>(&self) -> bool {
        self.config_types.contains_key(&TypeId::of::<C>())
    }

    /// Loads the marked properties of `target` from the config opened by `C`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BackendNotRegistered`] if `C` was never
    /// registered, [`SettingsError::Store`] if the file cannot be opened, and
    /// any error from [`load_settings`].
    pub fn load<C: ConfigType, T: Settings>(
        &self,
        target: &mut T,
        config_name: &str,
        path: impl AsRef<Path>,
    ) -> Result<LoadOutcome, SettingsError> {
        let store = self.open::<C>(config_name, path.as_ref())?;
        load_settings(target, &*store, &self.options)
    }

    /// Saves the marked properties of `source` to the config opened by `C`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::BackendNotRegistered`] if `C` was never
    /// registered, and any error from [`save_settings`].
    pub fn save<C: ConfigType, T: Settings>(
        &self,
        source: &T,
        config_name: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), SettingsError> {
        let mut store = self.open::<C>(config_name, path.as_ref())?;
        save_settings(source, &mut *store)
    }

    fn open<C: ConfigType>(
        &self,
        config_name: &str,
        path: &Path,
    ) -> Result<Box<dyn SettingsStore>, SettingsError> {
        let config_type = self
            .config_types
            .get(&TypeId::of::<C>())
            .ok_or(SettingsError::BackendNotRegistered(type_name::<C>()))?;
        debug!(
            config_type = type_name::<C>(),
            config_name,
            path = %path.display(),
            "opening settings store"
        );
        Ok(config_type.load_config(config_name, path)?)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::domain::convert::{Encoded, Raw, SettingShape, SettingType};
    use crate::domain::field::SettingField;
    use crate::domain::store::StoreError;
    use crate::infrastructure::memory::MemoryStore;

    /// Config type serving a fixed partial document, like an older config
    /// file that predates some properties.
    struct PartialConfig;

    impl ConfigType for PartialConfig {
        fn load_config(
            &self,
            _config_name: &str,
            _path: &Path,
        ) -> Result<Box<dyn SettingsStore>, StoreError> {
            let mut store = MemoryStore::new();
            store.add("Item1", "1");
            Ok(Box::new(store))
        }
    }

    struct NeverRegistered;

    impl ConfigType for NeverRegistered {
        fn load_config(&self, _: &str, _: &Path) -> Result<Box<dyn SettingsStore>, StoreError> {
            Ok(Box::new(MemoryStore::new()))
        }
    }

    #[derive(Default)]
    struct Partial {
        item1: Option<String>,
        item2: Option<String>,
        item3: i32,
    }

    fn read_item1(p: &Partial) -> Encoded {
        p.item1.encode()
    }
    fn write_item1(p: &mut Partial, raw: Raw<'_>) -> Result<(), String> {
        p.item1 = SettingType::decode(raw)?;
        Ok(())
    }
    fn read_item2(p: &Partial) -> Encoded {
        p.item2.encode()
    }
    fn write_item2(p: &mut Partial, raw: Raw<'_>) -> Result<(), String> {
        p.item2 = SettingType::decode(raw)?;
        Ok(())
    }
    fn read_item3(p: &Partial) -> Encoded {
        p.item3.encode()
    }
    fn write_item3(p: &mut Partial, raw: Raw<'_>) -> Result<(), String> {
        p.item3 = SettingType::decode(raw)?;
        Ok(())
    }

    impl Settings for Partial {
        fn setting_fields() -> &'static [SettingField<Self>] {
            const FIELDS: &[SettingField<Partial>] = &[
                SettingField {
                    name: "Item1",
                    type_name: "Option<String>",
                    shape: SettingShape::Optional,
                    readable: true,
                    writable: true,
                    read: read_item1,
                    write: write_item1,
                },
                SettingField {
                    name: "Item2",
                    type_name: "Option<String>",
                    shape: SettingShape::Optional,
                    readable: true,
                    writable: true,
                    read: read_item2,
                    write: write_item2,
                },
                SettingField {
                    name: "Item3",
                    type_name: "i32",
                    shape: SettingShape::Scalar,
                    readable: true,
                    writable: true,
                    read: read_item3,
                    write: write_item3,
                },
            ];
            FIELDS
        }
    }

    #[test]
    fn test_missing_settings_have_default_value() {
        // Arrange
        let mut settings = ConfigSettings::new();
        settings.register_config_type(PartialConfig);
        let mut partial = Partial::default();

        // Act
        let outcome = settings
            .load::<PartialConfig, _>(&mut partial, "", "")
            .expect("missing keys must not fail the load");

        // Assert
        assert_eq!(partial.item1.as_deref(), Some("1"));
        assert_eq!(partial.item2, None, "there was no value to load");
        assert_eq!(partial.item3, 0, "there was no value to load");
        assert_eq!(outcome.missing, vec!["Item3"]);
    }

    #[test]
    fn test_unregistered_config_type_is_rejected() {
        let settings = ConfigSettings::new();
        let mut partial = Partial::default();

        let err = settings
            .load::<NeverRegistered, _>(&mut partial, "", "")
            .unwrap_err();

        match err {
            SettingsError::BackendNotRegistered(name) => assert!(name.ends_with("NeverRegistered")),
            other => panic!("expected BackendNotRegistered, got {other:?}"),
        }
    }

    #[test]
    fn test_clear_config_types_forgets_registrations() {
        // Arrange
        let mut settings = ConfigSettings::new();
        settings.register_config_type(PartialConfig);
        assert!(settings.is_registered::<PartialConfig>());

        // Act
        settings.clear_config_types();

        // Assert
        assert!(!settings.is_registered::<PartialConfig>());
        let result = settings.save::<PartialConfig, _>(&Partial::default(), "", "");
        assert!(matches!(result, Err(SettingsError::BackendNotRegistered(_))));
    }

    #[test]
    fn test_strict_options_are_applied_to_loads() {
        let mut settings = ConfigSettings::with_options(LoadOptions::strict());
        settings.register_config_type(PartialConfig);
        let mut partial = Partial::default();

        let err = settings
            .load::<PartialConfig, _>(&mut partial, "", "")
            .unwrap_err();

        assert!(matches!(err, SettingsError::MissingKey(ref k) if k == "Item3"));
    }

    #[test]
    fn test_debug_reports_registration_count() {
        let mut settings = ConfigSettings::new();
        settings.register_config_type(PartialConfig);
        settings.register_config_type(PartialConfig);

        assert!(format!("{settings:?}").contains("registered: 1"));
    }
}
