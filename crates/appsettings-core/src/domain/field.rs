//! Field-descriptor tables.
//!
//! A type participates in settings binding by implementing [`Settings`],
//! normally through `#[derive(Settings)]`.  The derive walks the struct once,
//! at compile time, and emits one [`SettingField`] per field marked
//! `#[setting]`.  Unmarked fields never appear in the table, so the engine
//! cannot read or write them.
//!
//! ```text
//! #[derive(Settings)]
//! struct Profile {
//!     #[setting(rename = "Name")]      → SettingField { name: "Name", shape: Scalar, .. }
//!     name: String,
//!     #[setting(rename = "Recent")]    → SettingField { name: "Recent", shape: Array, .. }
//!     recent: Vec<String>,
//!     cache: Vec<u8>,                  → (no entry)
//! }
//! ```

use std::fmt;

use super::convert::{Encoded, Raw, SettingShape};

/// Descriptor for one marked property of `T`.
pub struct SettingField<T: 'static> {
    /// Key for scalars, key prefix for arrays.
    pub name: &'static str,
    /// Declared type, as written in the struct definition.
    pub type_name: &'static str,
    pub shape: SettingShape,
    /// `false` for write-only properties, which are never saved.
    pub readable: bool,
    /// `false` for read-only properties, which are never loaded.
    pub writable: bool,
    /// Reads the current value and encodes it.
    pub read: fn(&T) -> Encoded,
    /// Decodes raw strings and assigns the result.
    pub write: fn(&mut T, Raw<'_>) -> Result<(), String>,
}

impl<T: 'static> fmt::Debug for SettingField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingField")
            .field("name", &self.name)
            .field("type_name", &self.type_name)
            .field("shape", &self.shape)
            .field("readable", &self.readable)
            .field("writable", &self.writable)
            .finish_non_exhaustive()
    }
}

/// A struct whose marked fields can be loaded from and saved to a settings store.
///
/// Saving an array property clears every key that *contains* its name, and
/// fields are saved in table order.  An array named `Items` declared after a
/// property whose key contains `Items` (such as `OtherItems[0]` or
/// `ItemsCount`) therefore erases what that property just wrote.  Declare
/// such arrays first, or pick names that are not substrings of other keys.
pub trait Settings: Sized + 'static {
    /// The descriptor table, in declaration order.
    fn setting_fields() -> &'static [SettingField<Self>];
}

/// Key of element `index` of the array property `name`: `name[index]`.
pub fn indexed_key(name: &str, index: usize) -> String {
    format!("{name}[{index}]")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::convert::SettingType;

    struct Gauge {
        level: u8,
    }

    fn read_level(p: &Gauge) -> Encoded {
        p.level.encode()
    }

    fn write_level(p: &mut Gauge, raw: Raw<'_>) -> Result<(), String> {
        p.level = u8::decode(raw)?;
        Ok(())
    }

    impl Settings for Gauge {
        fn setting_fields() -> &'static [SettingField<Self>] {
            const FIELDS: &[SettingField<Gauge>] = &[SettingField {
                name: "Level",
                type_name: "u8",
                shape: SettingShape::Scalar,
                readable: true,
                writable: true,
                read: read_level,
                write: write_level,
            }];
            FIELDS
        }
    }

    #[test]
    fn test_indexed_key_uses_bracket_suffix() {
        assert_eq!(indexed_key("Items", 0), "Items[0]");
        assert_eq!(indexed_key("Items", 12), "Items[12]");
    }

    #[test]
    fn test_hand_written_table_reads_and_writes() {
        // Arrange
        let mut gauge = Gauge { level: 3 };
        let field = &Gauge::setting_fields()[0];

        // Act
        let encoded = (field.read)(&gauge);
        (field.write)(&mut gauge, Raw::Scalar("9")).expect("valid u8");

        // Assert
        assert_eq!(encoded, Encoded::Scalar(Some("3".into())));
        assert_eq!(gauge.level, 9);
    }

    #[test]
    fn test_debug_output_names_the_field() {
        let rendered = format!("{:?}", Gauge::setting_fields()[0]);
        assert!(rendered.contains("Level"));
    }
}
