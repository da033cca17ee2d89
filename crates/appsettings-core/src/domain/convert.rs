//! String converters for setting values.
//!
//! Every value stored in an `appSettings` section is a string.  This module
//! defines the two traits that bridge Rust types and those strings:
//!
//! - [`SettingConvert`] – a scalar converter (`to_setting` / `from_setting`).
//!   Implemented here for strings, `char`, `bool`, all integer and float
//!   primitives and `PathBuf`.  Enumerations get it from
//!   `#[derive(SettingEnum)]`.
//!
//! - [`SettingType`] – the shape-aware view the engine works with.  Scalars
//!   map to one key; `Option<T>` of any scalar maps to one key that is absent
//!   for `None`; `Vec<T>` and `Box<[T]>` of any scalar map to a run of
//!   indexed keys.
//!
//! # Formats
//!
//! | Type            | Written as              | Accepted on load                  |
//! |-----------------|-------------------------|-----------------------------------|
//! | `bool`          | `True` / `False`        | any case, surrounding whitespace  |
//! | integers        | decimal                 | decimal or `0x` hexadecimal       |
//! | floats          | shortest round-trip     | decimal, `inf`, `NaN`             |
//! | `Option<T>`     | key removed for `None`  | missing key loads as `None`       |
//! | `PathBuf`       | UTF-8 path              | any string                        |

use std::path::PathBuf;

use thiserror::Error;

/// A value could not be converted between its Rust type and its string form.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unable to convert setting `{property}` ({type_name}): {reason}")]
pub struct ConversionError {
    /// Key (or key prefix, for arrays) of the property.
    pub property: String,
    /// Declared Rust type of the property.
    pub type_name: String,
    pub reason: String,
}

/// Whether a setting occupies one key or a run of `Name[i]` keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingShape {
    Scalar,
    /// One key that may be absent; absence is the `None` value.
    Optional,
    Array,
}

/// Encoded form of a property value, ready to be written to a store.
///
/// `None` marks a value the converter cannot express as a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Encoded {
    Scalar(Option<String>),
    /// No value: the key is removed from the store.
    Absent,
    Array(Vec<Option<String>>),
}

/// Raw strings read from a store, ready to be decoded into a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Raw<'a> {
    Scalar(&'a str),
    /// The key of an optional property is not in the store.
    Absent,
    Array(&'a [String]),
}

/// Converts a scalar type to and from its setting string.
pub trait SettingConvert: Sized {
    /// Returns the string form, or `None` if this value has none.
    fn to_setting(&self) -> Option<String>;

    /// Parses the string form.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when `raw` is not a valid value.
    fn from_setting(raw: &str) -> Result<Self, String>;
}

/// Shape-aware conversion used by the engine and the derived field table.
pub trait SettingType: Sized {
    const SHAPE: SettingShape;

    fn encode(&self) -> Encoded;

    /// # Errors
    ///
    /// Returns a human-readable reason when the raw strings cannot be
    /// converted, or when `raw` has the wrong shape for this type.
    fn decode(raw: Raw<'_>) -> Result<Self, String>;
}

/// [`SettingType::encode`] for a scalar converter.
pub fn encode_scalar<T: SettingConvert>(value: &T) -> Encoded {
    Encoded::Scalar(value.to_setting())
}

/// [`SettingType::decode`] for a scalar converter.
///
/// # Errors
///
/// Fails when `raw` is an array or when the converter rejects the string.
pub fn decode_scalar<T: SettingConvert>(raw: Raw<'_>) -> Result<T, String> {
    match raw {
        Raw::Scalar(s) => T::from_setting(s),
        Raw::Array(_) => Err("expected a single value, found an indexed list".to_string()),
        Raw::Absent => Err("no value stored".to_string()),
    }
}

fn decode_elements<T: SettingConvert>(raw: Raw<'_>) -> Result<Vec<T>, String> {
    match raw {
        Raw::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, s)| T::from_setting(s).map_err(|reason| format!("element [{i}]: {reason}")))
            .collect(),
        Raw::Scalar(_) | Raw::Absent => Err("expected an indexed list, found a single value".to_string()),
    }
}

/// Implements [`SettingType`] as a scalar for types that already implement
/// [`SettingConvert`].
///
/// ```rust
/// use appsettings_core::{impl_setting_scalar, SettingConvert};
///
/// struct Port(u16);
///
/// impl SettingConvert for Port {
///     fn to_setting(&self) -> Option<String> {
///         self.0.to_setting()
///     }
///     fn from_setting(raw: &str) -> Result<Self, String> {
///         u16::from_setting(raw).map(Port)
///     }
/// }
///
/// impl_setting_scalar!(Port);
/// ```
#[macro_export]
macro_rules! impl_setting_scalar {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::SettingType for $ty {
                const SHAPE: $crate::SettingShape = $crate::SettingShape::Scalar;

                fn encode(&self) -> $crate::Encoded {
                    $crate::encode_scalar(self)
                }

                fn decode(raw: $crate::Raw<'_>) -> ::core::result::Result<Self, ::std::string::String> {
                    $crate::decode_scalar(raw)
                }
            }
        )+
    };
}

// ── Scalar converters ─────────────────────────────────────────────────────────

impl SettingConvert for String {
    fn to_setting(&self) -> Option<String> {
        Some(self.clone())
    }

    fn from_setting(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl SettingConvert for char {
    fn to_setting(&self) -> Option<String> {
        Some(self.to_string())
    }

    fn from_setting(raw: &str) -> Result<Self, String> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(format!("`{raw}` is not a single character")),
        }
    }
}

impl SettingConvert for bool {
    fn to_setting(&self) -> Option<String> {
        Some(if *self { "True" } else { "False" }.to_string())
    }

    fn from_setting(raw: &str) -> Result<Self, String> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if trimmed.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(format!("`{raw}` is not a valid boolean"))
        }
    }
}

impl SettingConvert for PathBuf {
    fn to_setting(&self) -> Option<String> {
        self.to_str().map(str::to_string)
    }

    fn from_setting(raw: &str) -> Result<Self, String> {
        Ok(PathBuf::from(raw))
    }
}

macro_rules! integer_convert {
    ($($ty:ty),+) => {
        $(
            impl SettingConvert for $ty {
                fn to_setting(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn from_setting(raw: &str) -> Result<Self, String> {
                    let trimmed = raw.trim();
                    let parsed = match trimmed
                        .strip_prefix("0x")
                        .or_else(|| trimmed.strip_prefix("0X"))
                    {
                        Some(hex) => <$ty>::from_str_radix(hex, 16),
                        None => trimmed.parse::<$ty>(),
                    };
                    parsed.map_err(|e| format!("`{raw}` is not a valid {}: {e}", stringify!($ty)))
                }
            }
        )+
    };
}

integer_convert!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! float_convert {
    ($($ty:ty),+) => {
        $(
            impl SettingConvert for $ty {
                fn to_setting(&self) -> Option<String> {
                    Some(self.to_string())
                }

                fn from_setting(raw: &str) -> Result<Self, String> {
                    raw.trim()
                        .parse::<$ty>()
                        .map_err(|e| format!("`{raw}` is not a valid {}: {e}", stringify!($ty)))
                }
            }
        )+
    };
}

float_convert!(f32, f64);

impl_setting_scalar!(
    String, char, bool, PathBuf, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize,
    f32, f64
);

// `None` is stored as a missing key so that every `Some` value, the empty
// string included, keeps its own text.
impl<T: SettingConvert> SettingType for Option<T> {
    const SHAPE: SettingShape = SettingShape::Optional;

    fn encode(&self) -> Encoded {
        match self {
            Some(value) => Encoded::Scalar(value.to_setting()),
            None => Encoded::Absent,
        }
    }

    fn decode(raw: Raw<'_>) -> Result<Self, String> {
        match raw {
            Raw::Scalar(s) => T::from_setting(s).map(Some),
            Raw::Absent => Ok(None),
            Raw::Array(_) => Err("expected a single value, found an indexed list".to_string()),
        }
    }
}

// ── Array converters ──────────────────────────────────────────────────────────

impl<T: SettingConvert> SettingType for Vec<T> {
    const SHAPE: SettingShape = SettingShape::Array;

    fn encode(&self) -> Encoded {
        Encoded::Array(self.iter().map(SettingConvert::to_setting).collect())
    }

    fn decode(raw: Raw<'_>) -> Result<Self, String> {
        decode_elements(raw)
    }
}

impl<T: SettingConvert> SettingType for Box<[T]> {
    const SHAPE: SettingShape = SettingShape::Array;

    fn encode(&self) -> Encoded {
        Encoded::Array(self.iter().map(SettingConvert::to_setting).collect())
    }

    fn decode(raw: Raw<'_>) -> Result<Self, String> {
        decode_elements(raw).map(Vec::into_boxed_slice)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_writes_title_case_and_reads_any_case() {
        assert_eq!(true.to_setting().as_deref(), Some("True"));
        assert_eq!(false.to_setting().as_deref(), Some("False"));
        assert_eq!(bool::from_setting("true"), Ok(true));
        assert_eq!(bool::from_setting(" FALSE "), Ok(false));
        assert!(bool::from_setting("yes").is_err());
    }

    #[test]
    fn test_integer_accepts_decimal_and_hex() {
        assert_eq!(i32::from_setting("-42"), Ok(-42));
        assert_eq!(u16::from_setting(" 24800 "), Ok(24800));
        assert_eq!(u32::from_setting("0xFF"), Ok(255));
        assert_eq!(u8::from_setting("0X10"), Ok(16));
    }

    #[test]
    fn test_integer_rejects_out_of_range_value() {
        let err = u8::from_setting("300").unwrap_err();
        assert!(err.contains("u8"), "reason should name the type, got {err}");
    }

    #[test]
    fn test_float_parses_special_values() {
        assert_eq!(f64::from_setting("1.5"), Ok(1.5));
        assert!(f64::from_setting("NaN").unwrap().is_nan());
        assert_eq!(f32::from_setting("inf"), Ok(f32::INFINITY));
        assert!(f64::from_setting("one").is_err());
    }

    #[test]
    fn test_char_requires_exactly_one_character() {
        assert_eq!(char::from_setting("x"), Ok('x'));
        assert!(char::from_setting("").is_err());
        assert!(char::from_setting("xy").is_err());
    }

    #[test]
    fn test_option_none_is_absent_and_empty_string_is_a_value() {
        // Arrange
        let empty: Option<String> = Some(String::new());

        // Act / Assert
        assert_eq!(None::<String>.encode(), Encoded::Absent);
        assert_eq!(empty.encode(), Encoded::Scalar(Some(String::new())));
        assert_eq!(Option::<String>::decode(Raw::Scalar("")), Ok(Some(String::new())));
        assert_eq!(Option::<i32>::decode(Raw::Absent), Ok(None));
        assert_eq!(Option::<i32>::decode(Raw::Scalar("7")), Ok(Some(7)));
        assert!(Option::<i32>::decode(Raw::Scalar("")).is_err());
    }

    #[test]
    fn test_absent_raw_is_rejected_by_non_optional_types() {
        assert!(i32::decode(Raw::Absent).is_err());
        assert!(Vec::<i32>::decode(Raw::Absent).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_path_has_no_string_form() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(&[0x66, 0x6f, 0xff]));
        assert_eq!(path.to_setting(), None);
    }

    #[test]
    fn test_vec_encodes_each_element() {
        let values = vec![1u8, 2, 3];
        assert_eq!(
            values.encode(),
            Encoded::Array(vec![Some("1".into()), Some("2".into()), Some("3".into())])
        );
    }

    #[test]
    fn test_vec_decode_reports_failing_index() {
        // Arrange
        let raw = vec!["1".to_string(), "two".to_string()];

        // Act
        let err = Vec::<i32>::decode(Raw::Array(&raw)).unwrap_err();

        // Assert
        assert!(err.starts_with("element [1]"), "got {err}");
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        assert!(Vec::<i32>::decode(Raw::Scalar("1")).is_err());
        assert!(i32::decode(Raw::Array(&[])).is_err());
    }

    #[test]
    fn test_boxed_slice_is_an_array_shape() {
        assert_eq!(<Option<u8> as SettingType>::SHAPE, SettingShape::Optional);
        assert_eq!(<Box<[String]> as SettingType>::SHAPE, SettingShape::Array);
        let raw = vec!["a".to_string()];
        let decoded = <Box<[String]>>::decode(Raw::Array(&raw)).unwrap();
        assert_eq!(&*decoded, &["a".to_string()]);
    }
}
