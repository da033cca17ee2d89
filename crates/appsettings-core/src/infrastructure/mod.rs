//! Infrastructure layer: concrete stores and config types.
//!
//! - **`native`** – TOML `.config` files with an `[appSettings]` table.
//! - **`xml`** – hand-maintained XML documents with an `appSettings` element.
//! - **`memory`** – an in-memory store for tests and synthesized sections.
//! - **`config_types`** – the built-in [`crate::ConfigType`] implementations
//!   that decide which file a logical configuration name maps to.

pub mod config_types;
pub mod memory;
pub mod native;
pub mod xml;
