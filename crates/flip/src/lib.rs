//! Immutable flag-sets, option-sets and option collections.
//!
//! `flip` is the facade crate: it re-exports the core types from `flip-core`
//! and the derives from `flip-macros`.
//!
//! # Quick Start
//!
//! ```ignore
//! use flip::prelude::*;
//!
//! #[derive(Clone, Debug, PartialEq, Eq, FlagSet)]
//! struct SearchFlags {
//!     #[flag(default)]
//!     case_sensitive: bool,
//!     whole_word: bool,
//! }
//!
//! let flags = SearchFlags::from_whole_word(true)?;
//! assert_eq!(flags.to_string(), "[case_sensitive, whole_word]");
//!
//! #[derive(Clone, Copy, Debug, PartialEq, Eq, Options)]
//! enum Feature {
//!     #[option(default)]
//!     Cache,
//!     Trace,
//! }
//!
//! let features = OptionCollection::build([(Feature::Trace, true)])?;
//! assert!(features[Feature::Cache] && features[Feature::Trace]);
//! ```
//!
//! Generated code names `flip_core` directly, so crates using the derives
//! depend on both `flip` and `flip-core`.
//!
//! # Role In The Architecture
//!
//! - **Field-sets** are user structs. Every "mutation" returns a new value;
//!   writes through [`FieldAccess`] fail with [`Error::Immutable`].
//! - **Option collections** are keyed by an [`Enumeration`] and hold the
//!   members whose state is `true`.
//! - **Validation** happens at compile time for derived types and once per
//!   type at runtime for hand-written declarations.

pub use flip_core::{
    DeclaredValue, DefinitionReason, Enumeration, Error, FieldAccess, FieldBits, FieldDecl,
    FieldSet, ImmutableTarget, Iter, MemberAccess, OptionCollection, Options, RESERVED_NAMES,
    Registry, Result, SetKind, Shape, Visibility,
};
pub use flip_macros::{FlagSet, OptionSet, Options};

/// Commonly used items.
pub mod prelude {
    pub use crate::{
        Enumeration, Error, FieldAccess, FieldSet, FlagSet, MemberAccess, OptionCollection,
        OptionSet, Options, Result, SetKind,
    };
}
