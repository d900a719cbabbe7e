//! Error types for flag-sets, option-sets and option collections.
//!
//! Every error here is a contract violation by the caller or by a type
//! declaration; nothing is transient and nothing is retried.

use std::error::Error as StdError;
use std::fmt;

use crate::shape::SetKind;

/// Result type used throughout `flip-core`.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a field-set declaration was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionReason {
    /// The field is part of the public surface.
    NonPrivate,
    /// The field's declared default is not a boolean.
    NonBoolean,
    /// The field name collides with an operation of the field-set.
    ReservedName,
    /// The same name is declared twice.
    DuplicateName,
    /// The name is not a valid identifier.
    InvalidName,
}

/// What a rejected write was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmutableTarget {
    /// A field of a flag-set or option-set.
    FieldSet(SetKind),
    /// An entry of an option collection.
    OptionCollection,
}

/// Errors raised by flag-sets, option-sets and option collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A field-set type declares a malformed shape.
    Definition {
        kind: SetKind,
        type_name: &'static str,
        field: String,
        reason: DefinitionReason,
    },
    /// A read or update named a field outside the validated shape.
    UnknownField {
        kind: SetKind,
        type_name: &'static str,
        field: String,
    },
    /// A direct write to an immutable value.
    Immutable(ImmutableTarget),
    /// A type does not satisfy the enumeration contract.
    InvalidType {
        type_name: &'static str,
        reason: String,
    },
    /// A member of some other type was used with a collection.
    TypeMismatch { expected: &'static str },
    /// No member of the enumeration has the given key.
    UnknownMember { type_name: &'static str, key: String },
}

impl Error {
    pub(crate) fn unknown_field(kind: SetKind, type_name: &'static str, field: &str) -> Self {
        Error::UnknownField {
            kind,
            type_name,
            field: field.to_string(),
        }
    }

    /// True for [`Error::Definition`].
    pub fn is_definition(&self) -> bool {
        matches!(self, Error::Definition { .. })
    }

    /// True for [`Error::UnknownField`].
    pub fn is_unknown_field(&self) -> bool {
        matches!(self, Error::UnknownField { .. })
    }

    /// True for [`Error::Immutable`].
    pub fn is_immutable(&self) -> bool {
        matches!(self, Error::Immutable(_))
    }

    /// True for [`Error::TypeMismatch`].
    pub fn is_type_mismatch(&self) -> bool {
        matches!(self, Error::TypeMismatch { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Definition {
                kind,
                type_name,
                field,
                reason,
            } => {
                let set = kind.set_noun();
                match reason {
                    DefinitionReason::NonPrivate => write!(
                        f,
                        "The {set} {type_name} declares non-private field \"{field}\". \
                         All fields must be private with boolean values."
                    ),
                    DefinitionReason::NonBoolean => write!(
                        f,
                        "The {set} {type_name} declares non-boolean field \"{field}\". \
                         All fields must be private with boolean values."
                    ),
                    DefinitionReason::ReservedName => write!(
                        f,
                        "The {set} {type_name} declares field with reserved name \"{field}\"."
                    ),
                    DefinitionReason::DuplicateName => write!(
                        f,
                        "The {set} {type_name} declares field \"{field}\" more than once."
                    ),
                    DefinitionReason::InvalidName => write!(
                        f,
                        "The {set} {type_name} declares field with invalid name \"{field}\"."
                    ),
                }
            }
            Error::UnknownField {
                kind,
                type_name,
                field,
            } => write!(
                f,
                "The {} {} does not have {} {} named \"{}\".",
                kind.set_noun(),
                type_name,
                kind.article(),
                kind.noun(),
                field
            ),
            Error::Immutable(ImmutableTarget::FieldSet(kind)) => {
                write!(f, "{} are immutable.", kind.plural_title())
            }
            Error::Immutable(ImmutableTarget::OptionCollection) => {
                write!(f, "Option collections are immutable.")
            }
            Error::InvalidType { type_name, reason } => {
                write!(f, "Type must be an enumeration ({type_name}: {reason}).")
            }
            Error::TypeMismatch { expected } => {
                write!(f, "Expected a member of the \"{expected}\" enumeration.")
            }
            Error::UnknownMember { type_name, key } => {
                write!(f, "The enumeration {type_name} has no member with key \"{key}\".")
            }
        }
    }
}

impl StdError for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_field_message() {
        let err = Error::unknown_field(SetKind::Flag, "TestFlags", "unknown");
        assert_eq!(
            err.to_string(),
            "The flag-set TestFlags does not have a flag named \"unknown\"."
        );

        let err = Error::unknown_field(SetKind::Option, "TestOptionSet", "unknown");
        assert_eq!(
            err.to_string(),
            "The option-set TestOptionSet does not have an option named \"unknown\"."
        );
    }

    #[test]
    fn test_definition_messages() {
        let err = Error::Definition {
            kind: SetKind::Flag,
            type_name: "Bad",
            field: "foo".to_string(),
            reason: DefinitionReason::NonPrivate,
        };
        assert_eq!(
            err.to_string(),
            "The flag-set Bad declares non-private field \"foo\". \
             All fields must be private with boolean values."
        );

        let err = Error::Definition {
            kind: SetKind::Option,
            type_name: "Bad",
            field: "defaults".to_string(),
            reason: DefinitionReason::ReservedName,
        };
        assert_eq!(
            err.to_string(),
            "The option-set Bad declares field with reserved name \"defaults\"."
        );
        assert!(err.is_definition());
    }

    #[test]
    fn test_immutable_messages() {
        assert_eq!(
            Error::Immutable(ImmutableTarget::FieldSet(SetKind::Flag)).to_string(),
            "Flag-sets are immutable."
        );
        assert_eq!(
            Error::Immutable(ImmutableTarget::FieldSet(SetKind::Option)).to_string(),
            "Option-sets are immutable."
        );
        assert_eq!(
            Error::Immutable(ImmutableTarget::OptionCollection).to_string(),
            "Option collections are immutable."
        );
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = Error::TypeMismatch {
            expected: "TestOptions",
        };
        assert_eq!(
            err.to_string(),
            "Expected a member of the \"TestOptions\" enumeration."
        );
        assert!(err.is_type_mismatch());
    }
}
