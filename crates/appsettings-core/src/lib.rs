//! # appsettings-core
//!
//! Loads and saves the marked fields of a Rust struct to and from a flat
//! `appSettings` key/value section.  Two physical backends are supported:
//!
//! - **`.config` files** – a TOML document whose `[appSettings]` table maps
//!   each key to a string value.
//! - **`.xml` files** – a hand-maintained XML document with an `appSettings`
//!   element whose `<add key="..." value="..."/>` children hold the entries.
//!
//! Both backends are driven through the same [`SettingsStore`] trait, so the
//! conversion engine never knows which file format it is talking to.
//!
//! # Architecture overview
//!
//! - **`domain`** – the field-descriptor table produced by
//!   `#[derive(Settings)]`, the string converters for every supported scalar
//!   type, and the store/backend traits.
//!
//! - **`application`** – the conversion engine (one pass over the descriptor
//!   table per load or save) and [`ConfigSettings`], the registry that maps a
//!   backend type to an opened store.
//!
//! - **`infrastructure`** – the concrete stores: the XML document model, the
//!   TOML `.config` store, an in-memory store, and the built-in config types.
//!
//! # Example
//!
//! ```rust
//! use appsettings_core::{load_settings, save_settings, LoadOptions, MemoryStore, Settings};
//!
//! #[derive(Debug, Default, PartialEq, Settings)]
//! struct Window {
//!     #[setting(rename = "Title")]
//!     title: String,
//!     #[setting(rename = "Sizes")]
//!     sizes: Vec<u32>,
//!     scratch: u8,
//! }
//!
//! let mut store = MemoryStore::new();
//! let window = Window { title: "Main".into(), sizes: vec![800, 600], scratch: 7 };
//! save_settings(&window, &mut store).unwrap();
//! assert_eq!(store.get("Sizes[1]").as_deref(), Some("600"));
//!
//! let mut loaded = Window::default();
//! load_settings(&mut loaded, &store, &LoadOptions::default()).unwrap();
//! assert_eq!(loaded.sizes, window.sizes);
//! assert_eq!(loaded.scratch, 0);
//! # use appsettings_core::SettingsStore;
//! ```

// The derive macros expand to `::appsettings_core::...` paths; this alias lets
// them resolve inside this crate's own tests as well.
extern crate self as appsettings_core;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shortcuts;

pub use application::config_settings::ConfigSettings;
pub use application::engine::{
    load_field, load_settings, save_field, save_settings, LoadOptions, LoadOutcome,
    MissingKeyPolicy, SettingsError,
};
pub use domain::convert::{
    decode_scalar, encode_scalar, ConversionError, Encoded, Raw, SettingConvert, SettingShape,
    SettingType,
};
pub use domain::field::{indexed_key, SettingField, Settings};
pub use domain::store::{ConfigType, SettingsStore, StoreError};
pub use infrastructure::config_types::{
    config_exists, AppConfig, CustomConfig, WebConfig, XmlConfig,
};
pub use infrastructure::memory::MemoryStore;
pub use infrastructure::native::NativeConfiguration;
pub use infrastructure::xml::XmlConfiguration;
pub use shortcuts::{
    default_config_settings, load_app_config, load_config, load_web_config, load_xml_config,
    save_app_config, save_config, save_web_config, save_xml_config,
};

#[cfg(feature = "derive")]
pub use appsettings_derive::{SettingEnum, Settings};
