//! XML backend.
//!
//! - **`document`** – a small element tree parsed and written with `quick-xml`.
//! - **`configuration`** – binds a document to a path and implements
//!   [`crate::SettingsStore`] over its `appSettings` section.

pub mod configuration;
pub mod document;

pub use configuration::{XmlConfiguration, APP_SETTINGS};
pub use document::{XmlDeclaration, XmlDocument, XmlElement, XmlError, XmlNode};
