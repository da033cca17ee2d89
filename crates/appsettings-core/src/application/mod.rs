//! Application layer: load/save orchestration.
//!
//! - **`engine`** – walks a type's field table and moves values between the
//!   struct and a [`crate::SettingsStore`].  Depends only on domain traits.
//!
//! - **`config_settings`** – the registry that resolves a config type to an
//!   opened store for each call, then runs the engine against it.

pub mod config_settings;
pub mod engine;
