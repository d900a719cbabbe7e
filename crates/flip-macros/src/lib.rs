//! Procedural macros for flip.
//!
//! - `#[derive(FlagSet)]` / `#[derive(OptionSet)]` turn a struct of private
//!   `bool` fields into an immutable field-set.
//! - `#[derive(Options)]` turns a fieldless enum into an enumeration usable as
//!   the key type of an option collection.
//!
//! Generated code refers to `flip_core`, so the consuming crate depends on it.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod field_set_derive;
mod options_derive;

use field_set_derive::SetKindDef;

/// Derive an immutable flag-set.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Debug, PartialEq, Eq, FlagSet)]
/// struct SearchFlags {
///     #[flag(default)]
///     case_sensitive: bool,
///     whole_word: bool,
/// }
/// ```
///
/// Fields must be private `bool`s and may not use a reserved name
/// (`defaults`, `all`, `none`, `diff`, ...). For every field `foo` the derive
/// generates `foo()`, `with_foo(bool)` and `from_foo(bool)`, plus `Display`,
/// `Serialize` and `Deserialize`. The struct must also implement `Clone`.
#[proc_macro_derive(FlagSet, attributes(flag, option))]
pub fn derive_flag_set(input: TokenStream) -> TokenStream {
    expand_field_set(input, SetKindDef::Flag)
}

/// Derive an immutable option-set.
///
/// Identical to `FlagSet` except that messages speak of options.
#[proc_macro_derive(OptionSet, attributes(flag, option))]
pub fn derive_option_set(input: TokenStream) -> TokenStream {
    expand_field_set(input, SetKindDef::Option)
}

/// Derive `Enumeration` and `Options` for a fieldless enum.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Copy, Debug, PartialEq, Eq, Options)]
/// enum TestOptions {
///     #[option(default)]
///     Foo,
///     Bar,
///     #[option(key = "bazz", default = false)]
///     Baz,
/// }
/// ```
///
/// Keys default to the variant name in snake_case.
#[proc_macro_derive(Options, attributes(option))]
pub fn derive_options(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match options_derive::parse_options(&input) {
        Ok(def) => options_derive::generate_options_impl(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand_field_set(input: TokenStream, kind: SetKindDef) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match field_set_derive::parse_field_set(&input, kind) {
        Ok(def) => field_set_derive::generate_field_set_impl(&def).into(),
        Err(err) => err.to_compile_error().into(),
    }
}
