//! Derive macros for `appsettings-core`.
//!
//! - `#[derive(Settings)]` builds the field-descriptor table for a struct
//!   with named fields.  Only fields carrying `#[setting]` are included.
//! - `#[derive(SettingEnum)]` converts a fieldless enum to and from its
//!   variant name, so it can be used as a setting value.
//!
//! Field options, combined inside one attribute:
//!
//! ```text
//! #[setting]                     key = field name
//! #[setting(rename = "Key")]     key = "Key"
//! #[setting(read_only)]          saved, never loaded
//! #[setting(write_only)]         loaded, never saved
//! ```
//!
//! Two marked fields may not resolve to the same key.  Fields are saved in
//! declaration order, and saving an array clears every key that contains its
//! name, so declare an array such as `Items` before `OtherItems` or any other
//! property whose key contains it.
//!
//! Generated code refers to `::appsettings_core`, so the core crate must be a
//! direct dependency under that name.

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, LitStr, Meta};

#[proc_macro_derive(Settings, attributes(setting))]
pub fn derive_settings(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    settings_impl(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

#[proc_macro_derive(SettingEnum, attributes(setting))]
pub fn derive_setting_enum(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);
    setting_enum_impl(&ast)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

// ── Attribute parsing ─────────────────────────────────────────────────────────

#[derive(Default)]
struct SettingAttr {
    rename: Option<LitStr>,
    read_only: bool,
    write_only: bool,
}

/// Parses every `#[setting]` attribute on an item.  `None` if there is none.
fn parse_setting_attrs(attrs: &[Attribute]) -> syn::Result<Option<SettingAttr>> {
    let mut found: Option<SettingAttr> = None;
    for attr in attrs.iter().filter(|a| a.path().is_ident("setting")) {
        let parsed = found.get_or_insert_with(SettingAttr::default);
        if matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                parsed.rename = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("read_only") {
                parsed.read_only = true;
                Ok(())
            } else if meta.path.is_ident("write_only") {
                parsed.write_only = true;
                Ok(())
            } else {
                Err(meta.error("expected `rename = \"...\"`, `read_only` or `write_only`"))
            }
        })?;
        if parsed.read_only && parsed.write_only {
            return Err(syn::Error::new_spanned(
                attr,
                "a setting cannot be both `read_only` and `write_only`",
            ));
        }
    }
    Ok(found)
}

// ── #[derive(Settings)] ───────────────────────────────────────────────────────

fn settings_impl(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &ast.ident;

    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "`Settings` cannot be derived for generic types",
        ));
    }
    let fields = match &ast.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    ident,
                    "`Settings` requires a struct with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                ident,
                "`Settings` can only be derived for structs",
            ))
        }
    };

    let mut accessors = Vec::new();
    let mut descriptors = Vec::new();
    let mut keys = HashSet::new();

    for (index, field) in fields.iter().enumerate() {
        let Some(attr) = parse_setting_attrs(&field.attrs)? else {
            continue;
        };
        let Some(field_ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;

        let key = match attr.rename {
            Some(lit) => lit.value(),
            None => field_ident.to_string().trim_start_matches("r#").to_string(),
        };
        if !keys.insert(key.clone()) {
            return Err(syn::Error::new_spanned(
                field,
                format!("duplicate setting key `{key}`"),
            ));
        }
        let type_name = quote!(#ty).to_string().replace(' ', "");
        let readable = !attr.write_only;
        let writable = !attr.read_only;
        let read_fn = format_ident!("__read_{}", index);
        let write_fn = format_ident!("__write_{}", index);

        accessors.push(quote! {
            fn #read_fn(target: &#ident) -> ::appsettings_core::Encoded {
                <#ty as ::appsettings_core::SettingType>::encode(&target.#field_ident)
            }
            fn #write_fn(
                target: &mut #ident,
                raw: ::appsettings_core::Raw<'_>,
            ) -> ::core::result::Result<(), ::std::string::String> {
                target.#field_ident = <#ty as ::appsettings_core::SettingType>::decode(raw)?;
                ::core::result::Result::Ok(())
            }
        });
        descriptors.push(quote! {
            ::appsettings_core::SettingField {
                name: #key,
                type_name: #type_name,
                shape: <#ty as ::appsettings_core::SettingType>::SHAPE,
                readable: #readable,
                writable: #writable,
                read: #read_fn,
                write: #write_fn,
            }
        });
    }

    Ok(quote! {
        impl ::appsettings_core::Settings for #ident {
            fn setting_fields() -> &'static [::appsettings_core::SettingField<Self>] {
                #(#accessors)*
                const FIELDS: &[::appsettings_core::SettingField<#ident>] = &[#(#descriptors),*];
                FIELDS
            }
        }
    })
}

// ── #[derive(SettingEnum)] ────────────────────────────────────────────────────

fn setting_enum_impl(ast: &DeriveInput) -> syn::Result<TokenStream2> {
    let ident = &ast.ident;

    if !ast.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &ast.generics,
            "`SettingEnum` cannot be derived for generic types",
        ));
    }
    let Data::Enum(data) = &ast.data else {
        return Err(syn::Error::new_spanned(
            ident,
            "`SettingEnum` can only be derived for enums",
        ));
    };
    if data.variants.is_empty() {
        return Err(syn::Error::new_spanned(
            ident,
            "`SettingEnum` requires at least one variant",
        ));
    }

    let mut variants = Vec::new();
    let mut names: Vec<String> = Vec::new();
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "`SettingEnum` variants cannot carry fields",
            ));
        }
        let name = match parse_setting_attrs(&variant.attrs)?.and_then(|a| a.rename) {
            Some(lit) => lit.value(),
            None => variant.ident.to_string(),
        };
        // Parsing ignores case, so a second spelling could never be read back.
        if names.iter().any(|n| n.eq_ignore_ascii_case(&name)) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate variant name `{name}` (names are matched case-insensitively)"),
            ));
        }
        variants.push(&variant.ident);
        names.push(name);
    }
    let enum_name = ident.to_string();

    Ok(quote! {
        impl ::appsettings_core::SettingConvert for #ident {
            fn to_setting(&self) -> ::core::option::Option<::std::string::String> {
                let name = match self {
                    #(Self::#variants => #names,)*
                };
                ::core::option::Option::Some(::std::string::ToString::to_string(name))
            }

            fn from_setting(raw: &str) -> ::core::result::Result<Self, ::std::string::String> {
                let raw = raw.trim();
                #(
                    if raw.eq_ignore_ascii_case(#names) {
                        return ::core::result::Result::Ok(Self::#variants);
                    }
                )*
                ::core::result::Result::Err(::std::format!("`{}` is not a variant of {}", raw, #enum_name))
            }
        }

        impl ::appsettings_core::SettingType for #ident {
            const SHAPE: ::appsettings_core::SettingShape = ::appsettings_core::SettingShape::Scalar;

            fn encode(&self) -> ::appsettings_core::Encoded {
                ::appsettings_core::encode_scalar(self)
            }

            fn decode(
                raw: ::appsettings_core::Raw<'_>,
            ) -> ::core::result::Result<Self, ::std::string::String> {
                ::appsettings_core::decode_scalar(raw)
            }
        }
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn settings_error(ast: DeriveInput) -> String {
        match settings_impl(&ast) {
            Ok(tokens) => panic!("expected an error, got {tokens}"),
            Err(e) => e.to_string(),
        }
    }

    fn enum_error(ast: DeriveInput) -> String {
        match setting_enum_impl(&ast) {
            Ok(tokens) => panic!("expected an error, got {tokens}"),
            Err(e) => e.to_string(),
        }
    }

    // ── Settings ──────────────────────────────────────────────────────────────

    #[test]
    fn test_settings_table_lists_marked_fields_only() {
        // Arrange
        let ast: DeriveInput = parse_quote! {
            struct Profile {
                #[setting(rename = "Name")]
                name: String,
                #[setting(read_only)]
                r#type: u8,
                cache: Vec<u8>,
            }
        };

        // Act
        let tokens = settings_impl(&ast).expect("valid input").to_string();

        // Assert
        assert!(tokens.contains("\"Name\""), "{tokens}");
        assert!(tokens.contains("\"type\""), "{tokens}");
        assert!(!tokens.contains("cache"), "{tokens}");
    }

    #[test]
    fn test_duplicate_renamed_key_is_rejected() {
        let ast: DeriveInput = parse_quote! {
            struct Profile {
                #[setting(rename = "Port")]
                port: u16,
                #[setting(rename = "Port")]
                fallback_port: u16,
            }
        };

        assert_eq!(settings_error(ast), "duplicate setting key `Port`");
    }

    #[test]
    fn test_rename_colliding_with_field_name_is_rejected() {
        let ast: DeriveInput = parse_quote! {
            struct Profile {
                #[setting]
                port: u16,
                #[setting(rename = "port")]
                other: u16,
            }
        };

        assert_eq!(settings_error(ast), "duplicate setting key `port`");
    }

    #[test]
    fn test_generic_struct_is_rejected() {
        let ast: DeriveInput = parse_quote! {
            struct Wrapper<T> {
                #[setting]
                value: T,
            }
        };

        assert!(settings_error(ast).contains("generic"));
    }

    #[test]
    fn test_tuple_struct_and_enum_are_rejected() {
        let tuple: DeriveInput = parse_quote! { struct Pair(#[setting] u8, u8); };
        let enumeration: DeriveInput = parse_quote! { enum Mode { On, Off } };

        assert!(settings_error(tuple).contains("named fields"));
        assert!(settings_error(enumeration).contains("only be derived for structs"));
    }

    #[test]
    fn test_read_only_with_write_only_is_rejected() {
        let ast: DeriveInput = parse_quote! {
            struct Profile {
                #[setting(read_only, write_only)]
                secret: String,
            }
        };

        assert!(settings_error(ast).contains("both `read_only` and `write_only`"));
    }

    #[test]
    fn test_unknown_option_is_rejected() {
        let ast: DeriveInput = parse_quote! {
            struct Profile {
                #[setting(default = "x")]
                name: String,
            }
        };

        assert!(settings_error(ast).contains("expected `rename"));
    }

    // ── SettingEnum ───────────────────────────────────────────────────────────

    #[test]
    fn test_setting_enum_uses_variant_names_and_renames() {
        let ast: DeriveInput = parse_quote! {
            enum Mode {
                Passive,
                #[setting(rename = "stand-by")]
                Standby,
            }
        };

        let tokens = setting_enum_impl(&ast).expect("valid input").to_string();

        assert!(tokens.contains("\"Passive\""), "{tokens}");
        assert!(tokens.contains("\"stand-by\""), "{tokens}");
    }

    #[test]
    fn test_setting_enum_rejects_variant_with_fields() {
        let ast: DeriveInput = parse_quote! {
            enum Mode {
                Fixed(u8),
            }
        };

        assert!(enum_error(ast).contains("cannot carry fields"));
    }

    #[test]
    fn test_setting_enum_rejects_names_equal_ignoring_case() {
        let ast: DeriveInput = parse_quote! {
            enum Mode {
                Active,
                #[setting(rename = "ACTIVE")]
                Loud,
            }
        };

        assert!(enum_error(ast).contains("duplicate variant name `ACTIVE`"));
    }

    #[test]
    fn test_setting_enum_rejects_struct_and_empty_enum() {
        let structure: DeriveInput = parse_quote! { struct Mode { on: bool } };
        let empty: DeriveInput = parse_quote! { enum Never {} };

        assert!(enum_error(structure).contains("only be derived for enums"));
        assert!(enum_error(empty).contains("at least one variant"));
    }
}
