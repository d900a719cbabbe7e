//! Core types and traits for flip.
//!
//! `flip-core` holds everything the derives in `flip-macros` generate code
//! against, plus the option collection, which needs no code generation.
//!
//! # Role In The Architecture
//!
//! - **Field-sets**: [`FieldSet`] is implemented by structs of private `bool`
//!   fields (flag-sets and option-sets). Each type's declaration is validated
//!   once and cached in its [`Registry`] together with the `defaults`, `all`
//!   and `none` singletons.
//! - **Option collections**: [`OptionCollection`] maps the members of an
//!   [`Enumeration`] to booleans, storing only the `true` ones.
//! - **Errors**: every failure is an [`Error`]; nothing is retried.
//!
//! Most applications should use the `flip` facade; the generated code refers
//! to this crate by name, so depend on both.

// Re-exported so generated serde impls resolve without a direct dependency.
pub use serde;

pub mod bits;
pub mod enumeration;
pub mod error;
pub mod field_set;
pub mod option_collection;
pub mod serde_support;
pub mod shape;

pub use bits::FieldBits;
pub use enumeration::{Enumeration, Options};
pub use error::{DefinitionReason, Error, ImmutableTarget, Result};
pub use field_set::{FieldAccess, FieldSet, render};
pub use option_collection::{Iter, MemberAccess, OptionCollection};
pub use shape::{DeclaredValue, FieldDecl, RESERVED_NAMES, Registry, SetKind, Shape, Visibility};
