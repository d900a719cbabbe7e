//! Implementation of the Options derive macro.
//!
//! Turns a fieldless enum into an `Enumeration` (ordered members with stable
//! keys) and an `Options` type (declared defaults).

use proc_macro2::TokenStream;
use quote::{ToTokens, quote};
use syn::{Data, DeriveInput, Error, Fields, Ident, Lit, LitStr, Result, Variant};

/// Parsed definition from an enum with `#[derive(Options)]`.
#[derive(Debug)]
pub struct OptionsDef {
    /// The enum name.
    pub name: Ident,
    /// Variants in declaration order.
    pub members: Vec<MemberDef>,
}

/// One enum variant.
#[derive(Debug)]
pub struct MemberDef {
    /// The variant identifier.
    pub ident: Ident,
    /// Stable identity key.
    pub key: String,
    /// Declared default, if any.
    pub default: Option<bool>,
}

/// Parse a `DeriveInput` into an `OptionsDef`.
pub fn parse_options(input: &DeriveInput) -> Result<OptionsDef> {
    if !input.generics.params.is_empty() {
        return Err(Error::new_spanned(
            &input.generics,
            "Options cannot be derived for generic enums",
        ));
    }

    let variants = match &input.data {
        Data::Enum(data) => &data.variants,
        _ => {
            return Err(Error::new_spanned(
                input,
                "Options can only be derived for enums",
            ));
        }
    };

    let mut members: Vec<MemberDef> = Vec::with_capacity(variants.len());
    for variant in variants {
        let member = parse_member(variant)?;
        if let Some(existing) = members.iter().find(|m| m.key == member.key) {
            return Err(Error::new_spanned(
                &variant.ident,
                format!(
                    "key \"{}\" is already used by `{}`",
                    member.key, existing.ident
                ),
            ));
        }
        members.push(member);
    }

    Ok(OptionsDef {
        name: input.ident.clone(),
        members,
    })
}

/// Parse one variant and its `#[option(...)]` attributes.
fn parse_member(variant: &Variant) -> Result<MemberDef> {
    if !matches!(variant.fields, Fields::Unit) {
        return Err(Error::new_spanned(
            variant,
            "Options variants cannot carry data",
        ));
    }

    let mut key = None;
    let mut default = None;

    for attr in &variant.attrs {
        if !attr.path().is_ident("option") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("key") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(Error::new_spanned(lit, "option keys cannot be empty"));
                }
                key = Some(lit.value());
            } else if meta.path.is_ident("default") {
                if meta.input.is_empty() || meta.input.peek(syn::Token![,]) {
                    default = Some(true);
                    return Ok(());
                }
                match meta.value()?.parse::<Lit>()? {
                    Lit::Bool(lit) => default = Some(lit.value),
                    other => {
                        return Err(Error::new_spanned(
                            other,
                            "expected a boolean literal for default",
                        ));
                    }
                }
            } else {
                let attr_name = meta.path.to_token_stream().to_string();
                return Err(Error::new_spanned(
                    &meta.path,
                    format!("unknown attribute `{attr_name}`. Valid attributes are: key, default"),
                ));
            }
            Ok(())
        })?;
    }

    Ok(MemberDef {
        key: key.unwrap_or_else(|| to_snake_case(&variant.ident.to_string())),
        ident: variant.ident.clone(),
        default,
    })
}

/// `CaseSensitive` -> `case_sensitive`, `FOO` -> `foo`, `HTTPServer` -> `http_server`.
fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

/// Generate the `Enumeration` and `Options` impls.
pub fn generate_options_impl(def: &OptionsDef) -> TokenStream {
    let name = &def.name;
    let type_name = name.to_string();
    let count = def.members.len();

    let members = def.members.iter().map(|m| {
        let ident = &m.ident;
        quote! { #name::#ident }
    });

    let key_arms = def.members.iter().map(|m| {
        let ident = &m.ident;
        let key = &m.key;
        quote! { #name::#ident => #key, }
    });

    let ordinal_arms = def.members.iter().enumerate().map(|(index, m)| {
        let ident = &m.ident;
        quote! { #name::#ident => #index, }
    });

    let defaults: Vec<TokenStream> = def
        .members
        .iter()
        .filter_map(|m| {
            let ident = &m.ident;
            m.default.map(|state| quote! { (#name::#ident, #state) })
        })
        .collect();
    let default_count = defaults.len();

    quote! {
        impl flip_core::Enumeration for #name {
            const NAME: &'static str = #type_name;

            fn members() -> &'static [Self] {
                static MEMBERS: [#name; #count] = [#(#members),*];
                &MEMBERS
            }

            fn key(&self) -> &'static str {
                match *self {
                    #(#key_arms)*
                }
            }

            fn ordinal(&self) -> usize {
                match *self {
                    #(#ordinal_arms)*
                }
            }
        }

        impl flip_core::Options for #name {
            fn defaults() -> &'static [(Self, bool)] {
                static DEFAULTS: [(#name, bool); #default_count] = [#(#defaults),*];
                &DEFAULTS
            }
        }
    }
}
