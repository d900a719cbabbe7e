//! The enumeration contract consumed by option collections.

use std::collections::HashSet;
use std::fmt;

use crate::error::{Error, Result};

/// A closed, ordered set of distinct members with stable keys.
///
/// Usually implemented with `#[derive(Options)]` on a fieldless enum.
/// Implementations must list every member exactly once in
/// [`Enumeration::members`], give each a distinct non-empty key, and report
/// each member's position in that list from [`Enumeration::ordinal`].
pub trait Enumeration: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Name of the enumeration, used in messages.
    const NAME: &'static str;

    /// Every member, in canonical order.
    fn members() -> &'static [Self];

    /// Stable identity key of this member.
    fn key(&self) -> &'static str;

    /// Position of this member in [`Enumeration::members`].
    fn ordinal(&self) -> usize;

    /// The member whose key is `key`.
    fn member_by_key(key: &str) -> Option<Self> {
        Self::members().iter().copied().find(|m| m.key() == key)
    }
}

/// An enumeration of boolean options with declared defaults.
pub trait Options: Enumeration {
    /// Default state of some members; members not listed default to `false`.
    fn defaults() -> &'static [(Self, bool)] {
        &[]
    }
}

/// Check that `E` honours the enumeration contract.
pub(crate) fn validate<E: Enumeration>() -> Result<()> {
    let invalid = |reason: String| -> Result<()> {
        tracing::warn!(type_name = E::NAME, reason = %reason, "Rejected enumeration");
        Err(Error::InvalidType {
            type_name: E::NAME,
            reason,
        })
    };

    let mut seen = HashSet::with_capacity(E::members().len());
    for (position, member) in E::members().iter().enumerate() {
        let key = member.key();
        if key.is_empty() {
            return invalid(format!("member {member:?} has an empty key"));
        }
        if !seen.insert(key) {
            return invalid(format!("key \"{key}\" is used by more than one member"));
        }
        if member.ordinal() != position {
            return invalid(format!(
                "member {member:?} reports ordinal {} but is listed at {position}",
                member.ordinal()
            ));
        }
    }

    tracing::trace!(
        type_name = E::NAME,
        members = E::members().len(),
        "Validated enumeration"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Color {
        Red,
        Green,
    }

    impl Enumeration for Color {
        const NAME: &'static str = "Color";

        fn members() -> &'static [Self] {
            &[Color::Red, Color::Green]
        }

        fn key(&self) -> &'static str {
            match self {
                Color::Red => "red",
                Color::Green => "green",
            }
        }

        fn ordinal(&self) -> usize {
            *self as usize
        }
    }

    /// Both members share a key.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Clashing {
        A,
        B,
    }

    impl Enumeration for Clashing {
        const NAME: &'static str = "Clashing";

        fn members() -> &'static [Self] {
            &[Clashing::A, Clashing::B]
        }

        fn key(&self) -> &'static str {
            "same"
        }

        fn ordinal(&self) -> usize {
            *self as usize
        }
    }

    /// Members listed out of ordinal order.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Shuffled {
        A,
        B,
    }

    impl Enumeration for Shuffled {
        const NAME: &'static str = "Shuffled";

        fn members() -> &'static [Self] {
            &[Shuffled::B, Shuffled::A]
        }

        fn key(&self) -> &'static str {
            match self {
                Shuffled::A => "a",
                Shuffled::B => "b",
            }
        }

        fn ordinal(&self) -> usize {
            *self as usize
        }
    }

    #[test]
    fn test_member_by_key() {
        assert_eq!(Color::member_by_key("green"), Some(Color::Green));
        assert_eq!(Color::member_by_key("blue"), None);
    }

    #[test]
    fn test_validate_accepts_well_formed_enumeration() {
        assert!(validate::<Color>().is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_keys() {
        let err = validate::<Clashing>().unwrap_err();
        assert!(matches!(err, Error::InvalidType { type_name: "Clashing", .. }));
        assert!(err.to_string().contains("\"same\""));
    }

    #[test]
    fn test_validate_rejects_wrong_ordinals() {
        let err = validate::<Shuffled>().unwrap_err();
        assert!(matches!(err, Error::InvalidType { type_name: "Shuffled", .. }));
    }
}
