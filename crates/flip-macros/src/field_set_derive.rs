//! Implementation of the FlagSet and OptionSet derive macros.
//!
//! Both derives accept a struct of private `bool` fields and generate the
//! `FieldSet` impl, typed accessors, `Display` and serde impls. They differ
//! only in the vocabulary passed to `flip-core`.

use proc_macro2::TokenStream;
use quote::{ToTokens, format_ident, quote};
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, Ident, LitBool, Result, Type};

/// Which derive is being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetKindDef {
    Flag,
    Option,
}

impl SetKindDef {
    fn derive_name(self) -> &'static str {
        match self {
            SetKindDef::Flag => "FlagSet",
            SetKindDef::Option => "OptionSet",
        }
    }

    fn set_noun(self) -> &'static str {
        match self {
            SetKindDef::Flag => "flag-set",
            SetKindDef::Option => "option-set",
        }
    }

    fn noun(self) -> &'static str {
        match self {
            SetKindDef::Flag => "flag",
            SetKindDef::Option => "option",
        }
    }

    fn kind_path(self) -> TokenStream {
        match self {
            SetKindDef::Flag => quote! { flip_core::SetKind::Flag },
            SetKindDef::Option => quote! { flip_core::SetKind::Option },
        }
    }
}

/// Parsed definition from a struct with `#[derive(FlagSet)]` or
/// `#[derive(OptionSet)]`.
#[derive(Debug)]
pub struct FieldSetDef {
    /// The struct name.
    pub name: Ident,
    /// Flag or option vocabulary.
    pub kind: SetKindDef,
    /// Declared fields in order.
    pub fields: Vec<FieldDef>,
    /// Whether the struct is a unit struct.
    pub unit: bool,
}

/// One declared field.
#[derive(Debug)]
pub struct FieldDef {
    /// The field identifier.
    pub ident: Ident,
    /// Declared default.
    pub default: bool,
}

impl FieldDef {
    fn name(&self) -> String {
        self.ident.unraw().to_string()
    }
}

/// Parse a `DeriveInput` into a `FieldSetDef`, rejecting malformed shapes.
pub fn parse_field_set(input: &DeriveInput, kind: SetKindDef) -> Result<FieldSetDef> {
    let name = input.ident.clone();
    let derive = kind.derive_name();

    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            format!("{derive} cannot be derived for generic structs"),
        ));
    }

    let (fields, unit) = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => (
                named
                    .named
                    .iter()
                    .map(|f| parse_field(&name, kind, f))
                    .collect::<Result<Vec<_>>>()?,
                false,
            ),
            Fields::Unit => (Vec::new(), true),
            Fields::Unnamed(_) => {
                return Err(Error::new_spanned(
                    &data.fields,
                    format!("{derive} requires a struct with named fields"),
                ));
            }
        },
        Data::Enum(_) => {
            return Err(Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs, not enums"),
            ));
        }
        Data::Union(_) => {
            return Err(Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs, not unions"),
            ));
        }
    };

    check_generated_names(&name, kind, &fields)?;

    Ok(FieldSetDef {
        name,
        kind,
        fields,
        unit,
    })
}

/// Parse one field and its `#[flag(...)]` / `#[option(...)]` attributes.
fn parse_field(type_name: &Ident, kind: SetKindDef, field: &Field) -> Result<FieldDef> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| Error::new_spanned(field, "expected named field"))?;
    let set = kind.set_noun();
    let field_name = ident.unraw().to_string();

    if !matches!(field.vis, syn::Visibility::Inherited) {
        return Err(Error::new_spanned(
            &field.vis,
            format!(
                "The {set} {type_name} declares non-private field \"{field_name}\". \
                 All fields must be private with boolean values."
            ),
        ));
    }

    if !is_bool_type(&field.ty) {
        return Err(Error::new_spanned(
            &field.ty,
            format!(
                "The {set} {type_name} declares non-boolean field \"{field_name}\". \
                 All fields must be private with boolean values."
            ),
        ));
    }

    if flip_core::RESERVED_NAMES.contains(&field_name.as_str()) {
        return Err(Error::new_spanned(
            &ident,
            format!("The {set} {type_name} declares field with reserved name \"{field_name}\"."),
        ));
    }

    let default = parse_default(&field.attrs, set, type_name, &field_name)?;

    Ok(FieldDef { ident, default })
}

/// Read `default`, `default = true` or `default = false` from the field's
/// attributes. A field without one defaults to `false`.
fn parse_default(attrs: &[Attribute], set: &str, type_name: &Ident, field_name: &str) -> Result<bool> {
    let mut default = false;

    for attr in attrs {
        if !attr.path().is_ident("flag") && !attr.path().is_ident("option") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("default") {
                if meta.input.is_empty() || meta.input.peek(syn::Token![,]) {
                    default = true;
                    return Ok(());
                }
                let value = meta.value()?;
                let lit: syn::Lit = value.parse()?;
                match lit {
                    syn::Lit::Bool(LitBool { value, .. }) => default = value,
                    other => {
                        return Err(Error::new_spanned(
                            other,
                            format!(
                                "The {set} {type_name} declares non-boolean field \"{field_name}\". \
                                 All fields must be private with boolean values."
                            ),
                        ));
                    }
                }
                Ok(())
            } else {
                let attr_name = meta.path.to_token_stream().to_string();
                Err(Error::new_spanned(
                    &meta.path,
                    format!("unknown attribute `{attr_name}`. Valid attributes are: default"),
                ))
            }
        })?;
    }

    Ok(default)
}

/// Reject fields whose generated `with_*` / `from_*` methods would clash with
/// another field's accessor.
fn check_generated_names(type_name: &Ident, kind: SetKindDef, fields: &[FieldDef]) -> Result<()> {
    let names: Vec<String> = fields.iter().map(FieldDef::name).collect();

    for field in fields {
        let name = field.name();
        let clashes = names
            .iter()
            .any(|other| name == format!("with_{other}") || name == format!("from_{other}"));
        if clashes {
            return Err(Error::new_spanned(
                &field.ident,
                format!(
                    "The {} {} declares field with reserved name \"{}\".",
                    kind.set_noun(),
                    type_name,
                    name
                ),
            ));
        }
    }

    Ok(())
}

/// Check if a type is `bool` (optionally path-qualified).
fn is_bool_type(ty: &Type) -> bool {
    if let Type::Path(type_path) = ty {
        if type_path.qself.is_some() {
            return false;
        }
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident == "bool" && segment.arguments.is_empty();
        }
    }
    false
}

/// Generate the `FieldSet` impl and everything built on it.
pub fn generate_field_set_impl(def: &FieldSetDef) -> TokenStream {
    let name = &def.name;
    let type_name = name.unraw().to_string();
    let kind = def.kind.kind_path();
    let noun = def.kind.noun();
    let count = def.fields.len();

    let decls = def.fields.iter().map(|field| {
        let field_name = field.name();
        let default = field.default;
        quote! { flip_core::FieldDecl::flag(#field_name, #default) }
    });

    let read_arms = def.fields.iter().enumerate().map(|(index, field)| {
        let ident = &field.ident;
        quote! { #index => self.#ident, }
    });

    let construct = if def.unit {
        quote! { #name }
    } else if def.fields.is_empty() {
        quote! { #name {} }
    } else {
        let inits = def.fields.iter().enumerate().map(|(index, field)| {
            let ident = &field.ident;
            quote! { #ident: bits.is_set(#index) }
        });
        quote! { #name { #(#inits),* } }
    };

    let from_bits_attr = if def.fields.is_empty() {
        quote! { #[allow(unused_variables)] }
    } else {
        TokenStream::new()
    };

    let accessors = def.fields.iter().map(|field| {
        let ident = &field.ident;
        let field_name = field.name();
        let with_ident = format_ident!("with_{}", field_name);
        let from_ident = format_ident!("from_{}", field_name);
        let get_doc = format!("Value of the `{field_name}` {noun}.");
        let with_doc = format!("Copy of this {noun} set with `{field_name}` changed.");
        let from_doc = format!("The defaults with `{field_name}` changed.");

        quote! {
            #[doc = #get_doc]
            #[must_use]
            pub fn #ident(&self) -> bool {
                self.#ident
            }

            #[doc = #with_doc]
            #[must_use]
            pub fn #with_ident(&self, value: bool) -> Self {
                let mut next = ::core::clone::Clone::clone(self);
                next.#ident = value;
                next
            }

            #[doc = #from_doc]
            pub fn #from_ident(value: bool) -> flip_core::Result<Self> {
                <Self as flip_core::FieldSet>::defaults().map(|defaults| defaults.#with_ident(value))
            }
        }
    });

    quote! {
        impl flip_core::FieldSet for #name {
            const TYPE_NAME: &'static str = #type_name;
            const KIND: flip_core::SetKind = #kind;

            fn declaration() -> &'static [flip_core::FieldDecl] {
                static FIELDS: [flip_core::FieldDecl; #count] = [#(#decls),*];
                &FIELDS
            }

            fn registry() -> &'static flip_core::Registry<Self> {
                static REGISTRY: flip_core::Registry<#name> = flip_core::Registry::new();
                &REGISTRY
            }

            fn read(&self, index: usize) -> bool {
                match index {
                    #(#read_arms)*
                    _ => false,
                }
            }

            #from_bits_attr
            fn from_bits(bits: &flip_core::FieldBits) -> Self {
                #construct
            }
        }

        impl #name {
            #(#accessors)*
        }

        impl ::core::fmt::Display for #name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                flip_core::render(self, f)
            }
        }

        impl flip_core::serde::Serialize for #name {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: flip_core::serde::Serializer,
            {
                flip_core::serde_support::serialize_field_set(self, serializer)
            }
        }

        impl<'de> flip_core::serde::Deserialize<'de> for #name {
            fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
            where
                D: flip_core::serde::Deserializer<'de>,
            {
                flip_core::serde_support::deserialize_field_set(deserializer)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn parse(input: DeriveInput) -> Result<FieldSetDef> {
        parse_field_set(&input, SetKindDef::Flag)
    }

    #[test]
    fn test_is_bool_type() {
        let ty: Type = parse_quote!(bool);
        assert!(is_bool_type(&ty));

        let ty: Type = parse_quote!(::core::primitive::bool);
        assert!(is_bool_type(&ty));

        let ty: Type = parse_quote!(Option<bool>);
        assert!(!is_bool_type(&ty));

        let ty: Type = parse_quote!(i32);
        assert!(!is_bool_type(&ty));
    }

    #[test]
    fn test_parse_defaults() {
        let def = parse(parse_quote! {
            struct TestFlags {
                #[flag(default)]
                foo: bool,
                bar: bool,
                #[flag(default = true)]
                baz: bool,
                #[option(default = false)]
                qux: bool,
            }
        })
        .unwrap();

        let fields: Vec<_> = def.fields.iter().map(|f| (f.name(), f.default)).collect();
        assert_eq!(
            fields,
            vec![
                ("foo".to_string(), true),
                ("bar".to_string(), false),
                ("baz".to_string(), true),
                ("qux".to_string(), false),
            ]
        );
        assert!(!def.unit);
    }

    #[test]
    fn test_unit_struct_has_no_fields() {
        let def = parse(parse_quote! { struct Empty; }).unwrap();
        assert!(def.unit);
        assert!(def.fields.is_empty());
    }

    #[test]
    fn test_empty_from_bits_allows_unused_input() {
        let def = parse(parse_quote! { struct Empty; }).unwrap();
        let tokens = generate_field_set_impl(&def).to_string();
        assert!(tokens.contains("allow (unused_variables)"));
        assert!(!tokens.contains("let _ = bits"));

        let def = parse(parse_quote! { struct One { foo: bool } }).unwrap();
        let tokens = generate_field_set_impl(&def).to_string();
        assert!(!tokens.contains("unused_variables"));
    }

    #[test]
    fn test_rejects_public_field() {
        let err = parse(parse_quote! {
            struct TestFlags {
                pub foo: bool,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("declares non-private field \"foo\""));
    }

    #[test]
    fn test_rejects_non_boolean_field() {
        let err = parse(parse_quote! {
            struct TestFlags {
                foo: u8,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("declares non-boolean field \"foo\""));

        let err = parse(parse_quote! {
            struct TestFlags {
                #[flag(default = 1)]
                foo: bool,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("declares non-boolean field \"foo\""));
    }

    #[test]
    fn test_rejects_reserved_names() {
        let err = parse(parse_quote! {
            struct TestFlags {
                defaults: bool,
            }
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The flag-set TestFlags declares field with reserved name \"defaults\"."
        );

        let err = parse(parse_quote! {
            struct TestFlags {
                foo: bool,
                with_foo: bool,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("reserved name \"with_foo\""));
    }

    #[test]
    fn test_rejects_names_of_trait_methods() {
        let err = parse(parse_quote! {
            struct TestFlags {
                #[flag(default)]
                to_string: bool,
            }
        })
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The flag-set TestFlags declares field with reserved name \"to_string\"."
        );

        for name in ["type_name", "field_names", "get_field", "set_field", "clone"] {
            let ident = Ident::new(name, proc_macro2::Span::call_site());
            let err = parse(parse_quote! {
                struct TestFlags {
                    foo: bool,
                    #ident: bool,
                }
            })
            .unwrap_err();
            assert!(err.to_string().contains(&format!("reserved name \"{name}\"")));
        }
    }

    #[test]
    fn test_rejects_unknown_attribute() {
        let err = parse(parse_quote! {
            struct TestFlags {
                #[flag(hidden)]
                foo: bool,
            }
        })
        .unwrap_err();
        assert!(err.to_string().contains("unknown attribute `hidden`"));
    }

    #[test]
    fn test_rejects_enums_tuples_and_generics() {
        assert!(parse(parse_quote! { enum TestFlags { A } }).is_err());
        assert!(parse(parse_quote! { struct TestFlags(bool); }).is_err());
        assert!(parse(parse_quote! { struct TestFlags<T> { foo: bool, t: T } }).is_err());
    }

    #[test]
    fn test_option_vocabulary() {
        let input: DeriveInput = parse_quote! {
            struct TestOptions {
                pub foo: bool,
            }
        };
        let err = parse_field_set(&input, SetKindDef::Option).unwrap_err();
        assert!(err.to_string().starts_with("The option-set TestOptions"));
    }

    #[test]
    fn test_generated_impl_mentions_every_field() {
        let def = parse(parse_quote! {
            struct TestFlags {
                #[flag(default)]
                foo: bool,
                bar: bool,
            }
        })
        .unwrap();
        let tokens = generate_field_set_impl(&def).to_string();

        assert!(tokens.contains("impl flip_core :: FieldSet for TestFlags"));
        assert!(tokens.contains("fn with_foo"));
        assert!(tokens.contains("fn from_bar"));
        assert!(tokens.contains("\"foo\" , true"));
    }
}
