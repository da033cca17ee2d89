//! The type conversion engine.
//!
//! One pass over a type's [`SettingField`] table moves every marked property
//! between the struct and a [`SettingsStore`]:
//!
//! ```text
//! load:  store.get("Name")                  ──decode──▶ target.name
//!        store.get("Items[0]"), "Items[1]"… ──decode──▶ target.items
//!
//! save:  source.name  ──encode──▶ remove("Name"); add("Name", v)
//!        source.items ──encode──▶ remove_by_prefix("Items"); add("Items[i]", v)…
//!        store.save()   (once, after every property)
//! ```
//!
//! An `Option` property holding `None` is saved as `remove("Name")` alone,
//! and an absent key loads back as `None`.
//!
//! # Missing keys
//!
//! A scalar key that is not in the store, or an array whose `Name[0]` is not
//! in the store, yields [`SettingsError::MissingKey`] from [`load_field`].
//! [`load_settings`] tolerates it by default so that a partial or older
//! config file leaves those properties at their current values.  Arrays are
//! still assigned (as empty) before the missing key is reported.
//!
//! # Array scan
//!
//! Indices are read from 0 upwards and the scan stops at the first missing
//! index.  With `Items[0]` and `Items[2]` present but `Items[1]` missing, the
//! loaded array has a single element.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::domain::convert::{ConversionError, Encoded, Raw, SettingShape};
use crate::domain::field::{indexed_key, SettingField, Settings};
use crate::domain::store::{SettingsStore, StoreError};

/// Error type for load and save passes.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The key (or index 0 of an array) is not in the store.
    #[error("no setting found for key `{0}`")]
    MissingKey(String),

    /// A value could not be converted; aborts the whole pass.
    #[error(transparent)]
    Conversion(#[from] ConversionError),

    /// The backing store could not be opened or persisted.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// No config type of the requested kind has been registered.
    #[error("config type `{0}` has not been registered")]
    BackendNotRegistered(&'static str),
}

/// What [`load_settings`] does when a key is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingKeyPolicy {
    /// Leave the property at its current value and continue.
    #[default]
    Keep,
    /// Abort the load with [`SettingsError::MissingKey`].
    Fail,
}

/// Options for a load pass.
///
/// Deserializable so a host application can keep them in its own TOML
/// config, e.g. `missing_keys = "fail"`.  Omitted fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    pub missing_keys: MissingKeyPolicy,
}

impl LoadOptions {
    /// Options that reject any missing key.
    pub fn strict() -> Self {
        Self {
            missing_keys: MissingKeyPolicy::Fail,
        }
    }
}

/// Which properties a load pass assigned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Properties assigned from the store.
    pub loaded: Vec<&'static str>,
    /// Properties whose key was missing.
    ///
    /// A missing scalar keeps its current value.  A missing array (no
    /// `Name[0]`) is still assigned an empty collection before it is listed
    /// here, so its previous elements are gone.  `Option` properties are never
    /// listed: an absent key loads as `None`.
    pub missing: Vec<&'static str>,
}

impl LoadOutcome {
    /// `true` when every writable property was found in the store.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Loads every writable marked property of `target` from `store`.
///
/// # Errors
///
/// Returns [`SettingsError::Conversion`] if any stored value cannot be
/// converted, and [`SettingsError::MissingKey`] for a missing key when
/// `options.missing_keys` is [`MissingKeyPolicy::Fail`].  Properties loaded
/// before the failure keep their new values.
pub fn load_settings<T, S>(
    target: &mut T,
    store: &S,
    options: &LoadOptions,
) -> Result<LoadOutcome, SettingsError>
where
    T: Settings,
    S: SettingsStore + ?Sized,
{
    let mut outcome = LoadOutcome::default();

    for field in T::setting_fields().iter().filter(|f| f.writable) {
        match load_field(target, field, store) {
            Ok(()) => outcome.loaded.push(field.name),
            Err(SettingsError::MissingKey(key))
                if options.missing_keys == MissingKeyPolicy::Keep =>
            {
                debug!(property = field.name, %key, "setting not found, keeping current value");
                outcome.missing.push(field.name);
            }
            Err(e) => return Err(e),
        }
    }

    Ok(outcome)
}

/// Loads a single property.
///
/// # Errors
///
/// Returns [`SettingsError::MissingKey`] when the scalar key or `Name[0]` is
/// absent, and [`SettingsError::Conversion`] when the stored strings cannot be
/// converted to the property's type.
pub fn load_field<T, S>(
    target: &mut T,
    field: &SettingField<T>,
    store: &S,
) -> Result<(), SettingsError>
where
    T: Settings,
    S: SettingsStore + ?Sized,
{
    match field.shape {
        SettingShape::Scalar => {
            let value = store
                .get(field.name)
                .ok_or_else(|| SettingsError::MissingKey(field.name.to_string()))?;
            (field.write)(target, Raw::Scalar(&value))
                .map_err(|reason| conversion_error(field, reason))?;
            debug!(property = field.name, "loaded setting");
            Ok(())
        }
        SettingShape::Optional => {
            let value = store.get(field.name);
            let raw = value.as_deref().map_or(Raw::Absent, Raw::Scalar);
            (field.write)(target, raw).map_err(|reason| conversion_error(field, reason))?;
            debug!(property = field.name, present = value.is_some(), "loaded optional setting");
            Ok(())
        }
        SettingShape::Array => {
            let values = read_indexed(store, field.name);
            (field.write)(target, Raw::Array(&values))
                .map_err(|reason| conversion_error(field, reason))?;
            if values.is_empty() {
                return Err(SettingsError::MissingKey(indexed_key(field.name, 0)));
            }
            debug!(property = field.name, len = values.len(), "loaded indexed setting");
            Ok(())
        }
    }
}

/// Collects `name[0]`, `name[1]`, … up to the first missing index.
fn read_indexed<S: SettingsStore + ?Sized>(store: &S, name: &str) -> Vec<String> {
    let mut values = Vec::new();
    while let Some(value) = store.get(&indexed_key(name, values.len())) {
        values.push(value);
    }
    values
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Saves every readable marked property of `source` into `store`, then
/// persists the store once.
///
/// # Errors
///
/// Returns [`SettingsError::Conversion`] if a scalar property has no string
/// form; the store is not persisted in that case, although entries written
/// before the failure remain in memory.  Returns [`SettingsError::Store`] if
/// persisting fails.
pub fn save_settings<T, S>(source: &T, store: &mut S) -> Result<(), SettingsError>
where
    T: Settings,
    S: SettingsStore + ?Sized,
{
    for field in T::setting_fields().iter().filter(|f| f.readable) {
        save_field(source, field, store)?;
    }
    store.save()?;
    Ok(())
}

/// Writes a single property into `store` without persisting it.
///
/// Scalars are written as `remove(name)` followed by `add(name, value)`.
/// An `Option` holding `None` only removes `name`.  Arrays first clear every key containing `name`, then add `name[i]` for
/// each element, skipping elements that have no string form.
///
/// # Errors
///
/// Returns [`SettingsError::Conversion`] if a scalar value has no string form.
pub fn save_field<T, S>(source: &T, field: &SettingField<T>, store: &mut S) -> Result<(), SettingsError>
where
    T: Settings,
    S: SettingsStore + ?Sized,
{
    match (field.read)(source) {
        Encoded::Scalar(Some(value)) => {
            store.remove(field.name);
            store.add(field.name, &value);
            debug!(property = field.name, "saved setting");
        }
        Encoded::Scalar(None) => {
            return Err(conversion_error(
                field,
                "value has no string representation".to_string(),
            )
            .into());
        }
        Encoded::Absent => {
            store.remove(field.name);
            debug!(property = field.name, "removed unset setting");
        }
        Encoded::Array(values) => {
            store.remove_by_prefix(field.name);
            for (i, value) in values.iter().enumerate() {
                match value {
                    Some(value) => store.add(&indexed_key(field.name, i), value),
                    None => debug!(property = field.name, index = i, "skipping element with no string form"),
                }
            }
            debug!(property = field.name, len = values.len(), "saved indexed setting");
        }
    }
    Ok(())
}

fn conversion_error<T: 'static>(field: &SettingField<T>, reason: String) -> ConversionError {
    ConversionError {
        property: field.name.to_string(),
        type_name: field.type_name.to_string(),
        reason,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
