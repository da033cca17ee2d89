//! Domain types for settings binding.
//!
//! Nothing in this module touches the file system.  It defines:
//!
//! - **`convert`** – how each supported scalar type turns into a string and
//!   back, and how arrays wrap a scalar converter.
//! - **`field`** – the per-struct field-descriptor table consumed by the
//!   engine, plus the `Name[i]` key scheme for arrays.
//! - **`store`** – the [`store::SettingsStore`] trait every backend implements
//!   and the [`store::ConfigType`] trait used to open one.

pub mod convert;
pub mod field;
pub mod store;
