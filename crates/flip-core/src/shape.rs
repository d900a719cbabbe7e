//! Field-set declarations and their validated, cached shapes.
//!
//! A concrete field-set type describes itself with a static table of
//! [`FieldDecl`]s (normally generated by `#[derive(FlagSet)]` or
//! `#[derive(OptionSet)]`). The table is validated the first time the type is
//! used and the outcome, a [`Shape`] or the [`Error::Definition`] that rejected
//! it, is cached in the type's [`Registry`] for the rest of the process.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::bits::FieldBits;
use crate::error::{DefinitionReason, Error, Result};

/// Names a field may not use because the generated accessor would shadow an
/// operation of the field-set, a `FieldAccess` method, or a method of a trait
/// every field-set implements (`Clone`, `Display`, serde).
pub const RESERVED_NAMES: &[&str] = &[
    "defaults",
    "all",
    "none",
    "diff",
    "symmetric_diff",
    "intersect",
    "union",
    "inverse",
    "of",
    "with",
    "enable",
    "enabled",
    "get",
    "set",
    "shape",
    "entries",
    "declaration",
    "registry",
    "read",
    "bits",
    "from_bits",
    "to_bits",
    "type_name",
    "field_names",
    "get_field",
    "set_field",
    "clone",
    "fmt",
    "to_string",
    "serialize",
    "deserialize",
];

/// Whether a type calls its fields flags or options.
///
/// The two behave identically; the kind only changes the vocabulary of
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetKind {
    /// A flag-set (`#[derive(FlagSet)]`).
    Flag,
    /// An option-set (`#[derive(OptionSet)]`).
    Option,
}

impl SetKind {
    /// `"flag"` or `"option"`.
    pub const fn noun(self) -> &'static str {
        match self {
            SetKind::Flag => "flag",
            SetKind::Option => "option",
        }
    }

    /// `"flag-set"` or `"option-set"`.
    pub const fn set_noun(self) -> &'static str {
        match self {
            SetKind::Flag => "flag-set",
            SetKind::Option => "option-set",
        }
    }

    pub(crate) const fn article(self) -> &'static str {
        match self {
            SetKind::Flag => "a",
            SetKind::Option => "an",
        }
    }

    pub(crate) const fn plural_title(self) -> &'static str {
        match self {
            SetKind::Flag => "Flag-sets",
            SetKind::Option => "Option-sets",
        }
    }
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.set_noun())
    }
}

/// Declared visibility of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Only reachable through the generated accessors.
    Private,
    /// Reachable directly from outside the type.
    Public,
}

/// Declared default of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclaredValue {
    /// A boolean default.
    Bool(bool),
    /// Anything else, described by its type name.
    Other(&'static str),
}

/// One entry of a field-set declaration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDecl {
    /// Field name.
    pub name: &'static str,
    /// Declared visibility.
    pub visibility: Visibility,
    /// Declared default value.
    pub default: DeclaredValue,
}

impl FieldDecl {
    /// A private boolean field, the only well-formed kind of field.
    pub const fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            visibility: Visibility::Private,
            default: DeclaredValue::Bool(default),
        }
    }

    /// A field with explicit visibility and default.
    pub const fn new(name: &'static str, visibility: Visibility, default: DeclaredValue) -> Self {
        Self {
            name,
            visibility,
            default,
        }
    }
}

/// Validated description of a concrete field-set type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    type_name: &'static str,
    kind: SetKind,
    names: Vec<&'static str>,
    defaults: FieldBits,
}

impl Shape {
    /// Validate a declaration table.
    ///
    /// Fields are checked in declaration order and the first offending field
    /// is reported.
    pub fn validate(
        type_name: &'static str,
        kind: SetKind,
        declaration: &[FieldDecl],
    ) -> Result<Self> {
        let mut names: Vec<&'static str> = Vec::with_capacity(declaration.len());
        let mut defaults = FieldBits::empty(declaration.len());

        for (idx, decl) in declaration.iter().enumerate() {
            let reject = |reason: DefinitionReason| -> Result<Self> {
                tracing::warn!(
                    type_name = type_name,
                    kind = %kind,
                    field = decl.name,
                    reason = ?reason,
                    "Rejected field-set declaration"
                );
                Err(Error::Definition {
                    kind,
                    type_name,
                    field: decl.name.to_string(),
                    reason,
                })
            };

            if decl.visibility != Visibility::Private {
                return reject(DefinitionReason::NonPrivate);
            }
            let DeclaredValue::Bool(default) = decl.default else {
                return reject(DefinitionReason::NonBoolean);
            };
            if !is_identifier(decl.name) {
                return reject(DefinitionReason::InvalidName);
            }
            if RESERVED_NAMES.contains(&decl.name) {
                return reject(DefinitionReason::ReservedName);
            }
            if names.contains(&decl.name) {
                return reject(DefinitionReason::DuplicateName);
            }

            names.push(decl.name);
            defaults.set(idx, default);
        }

        tracing::debug!(
            type_name = type_name,
            kind = %kind,
            fields = names.len(),
            "Validated field-set shape"
        );

        Ok(Self {
            type_name,
            kind,
            names,
            defaults,
        })
    }

    /// Name of the concrete type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Flag or option vocabulary.
    pub fn kind(&self) -> SetKind {
        self.kind
    }

    /// Field names in declaration order.
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True when the type declares no fields.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Declared defaults, one slot per field.
    pub fn defaults(&self) -> &FieldBits {
        &self.defaults
    }

    /// Position of `name`, or [`Error::UnknownField`].
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.names
            .iter()
            .position(|n| *n == name)
            .ok_or_else(|| Error::unknown_field(self.kind, self.type_name, name))
    }
}

/// Field names must be plain identifiers.
fn is_identifier(name: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$")
            .map_err(|e| {
                tracing::error!(error = %e, "Identifier pattern failed to compile");
            })
            .ok()
    });
    pattern.as_ref().is_some_and(|re| re.is_match(name))
}

/// Per-type cache of the validated shape and the factory singletons.
///
/// Each concrete field-set type owns one `static` registry. Every slot is
/// written at most once; the shape slot stores the validation outcome so a
/// rejected declaration keeps failing with the same error.
pub struct Registry<S> {
    shape: OnceLock<Result<Shape>>,
    defaults: OnceLock<S>,
    all: OnceLock<S>,
    none: OnceLock<S>,
}

impl<S> Registry<S> {
    /// An empty registry, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            shape: OnceLock::new(),
            defaults: OnceLock::new(),
            all: OnceLock::new(),
            none: OnceLock::new(),
        }
    }

    /// The cached shape, validating with `init` on first use.
    pub fn shape(&'static self, init: impl FnOnce() -> Result<Shape>) -> Result<&'static Shape> {
        self.shape.get_or_init(init).as_ref().map_err(Clone::clone)
    }

    pub(crate) fn defaults(&'static self, init: impl FnOnce() -> S) -> &'static S {
        self.defaults.get_or_init(|| {
            tracing::trace!("Caching field-set defaults");
            init()
        })
    }

    pub(crate) fn all(&'static self, init: impl FnOnce() -> S) -> &'static S {
        self.all.get_or_init(|| {
            tracing::trace!("Caching all-true field-set");
            init()
        })
    }

    pub(crate) fn none(&'static self, init: impl FnOnce() -> S) -> &'static S {
        self.none.get_or_init(|| {
            tracing::trace!("Caching all-false field-set");
            init()
        })
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}
