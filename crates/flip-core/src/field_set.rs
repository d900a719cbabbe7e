//! Immutable, fixed-shape boolean records.
//!
//! A field-set is a struct of private `bool` fields that implements
//! [`FieldSet`], normally through `#[derive(FlagSet)]` or
//! `#[derive(OptionSet)]`. The trait supplies everything else: the cached
//! factory instances, string-keyed reads and fluent updates, and the boolean
//! algebra between two instances of the same type.
//!
//! # Example
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
//! let flags = SearchFlags::defaults()?.with_whole_word(true);
//! assert_eq!(flags.to_string(), "[case_sensitive, whole_word]");
//! assert!(!flags.inverse().case_sensitive());
//! ```

use std::fmt;

use crate::bits::FieldBits;
use crate::error::{Error, ImmutableTarget, Result};
use crate::shape::{FieldDecl, Registry, SetKind, Shape};

/// A flag-set or option-set type.
///
/// Implementors supply the declaration table, the per-type registry and the
/// two conversions between the struct and [`FieldBits`]. Instances are only
/// produced by the provided methods; every method that "changes" a field
/// returns a new instance and leaves the receiver untouched.
pub trait FieldSet: Clone + Send + Sync + Sized + 'static {
    /// Name of the concrete type, used in messages.
    const TYPE_NAME: &'static str;

    /// Flag or option vocabulary.
    const KIND: SetKind;

    /// Declared fields in declaration order.
    fn declaration() -> &'static [FieldDecl];

    /// The type's process-wide cache.
    fn registry() -> &'static Registry<Self>;

    /// Value of the field at `index` in declaration order.
    #[doc(hidden)]
    fn read(&self, index: usize) -> bool;

    /// Build an instance from one slot per declared field.
    #[doc(hidden)]
    fn from_bits(bits: &FieldBits) -> Self;

    /// The validated shape, validating the declaration on first use.
    fn shape() -> Result<&'static Shape> {
        Self::registry().shape(|| Shape::validate(Self::TYPE_NAME, Self::KIND, Self::declaration()))
    }

    /// Every field at its declared default. Cached per type.
    fn defaults() -> Result<&'static Self> {
        let shape = Self::shape()?;
        Ok(Self::registry().defaults(|| Self::from_bits(shape.defaults())))
    }

    /// Every field `true`. Cached per type.
    fn all() -> Result<&'static Self> {
        let shape = Self::shape()?;
        Ok(Self::registry().all(|| Self::from_bits(&FieldBits::full(shape.len()))))
    }

    /// Every field `false`. Cached per type.
    fn none() -> Result<&'static Self> {
        let shape = Self::shape()?;
        Ok(Self::registry().none(|| Self::from_bits(&FieldBits::empty(shape.len()))))
    }

    /// The defaults with one field changed.
    fn of(name: &str, value: bool) -> Result<Self> {
        Self::defaults()?.with(name, value)
    }

    /// The defaults with one field switched on.
    fn enabled(name: &str) -> Result<Self> {
        Self::of(name, true)
    }

    /// Value of the named field.
    fn get(&self, name: &str) -> Result<bool> {
        let index = Self::shape()?.index_of(name)?;
        Ok(self.read(index))
    }

    /// Copy of this instance with one field changed.
    fn with(&self, name: &str, value: bool) -> Result<Self> {
        let index = Self::shape()?.index_of(name)?;
        Ok(Self::from_bits(&self.to_bits().with(index, value)))
    }

    /// Copy of this instance with one field switched on.
    fn enable(&self, name: &str) -> Result<Self> {
        self.with(name, true)
    }

    /// One slot per declared field.
    fn to_bits(&self) -> FieldBits {
        FieldBits::from_fn(Self::declaration().len(), |index| self.read(index))
    }

    /// `(name, value)` for every field in declaration order.
    fn entries(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        Self::declaration()
            .iter()
            .enumerate()
            .map(move |(index, decl)| (decl.name, self.read(index)))
    }

    /// Fields set here and not in `other`.
    fn diff(&self, other: &Self) -> Self {
        Self::from_bits(&self.to_bits().difference(&other.to_bits()))
    }

    /// Fields set in exactly one of the two.
    fn symmetric_diff(&self, other: &Self) -> Self {
        Self::from_bits(&self.to_bits().symmetric_difference(&other.to_bits()))
    }

    /// Fields set in both.
    fn intersect(&self, other: &Self) -> Self {
        Self::from_bits(&self.to_bits().intersection(&other.to_bits()))
    }

    /// Fields set in either.
    fn union(&self, other: &Self) -> Self {
        Self::from_bits(&self.to_bits().union(&other.to_bits()))
    }

    /// Every field flipped.
    fn inverse(&self) -> Self {
        Self::from_bits(&self.to_bits().not())
    }
}

/// Write the names of the `true` fields as `[foo, baz]`.
///
/// Used by the `Display` impl the derives generate.
pub fn render<S: FieldSet>(set: &S, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str("[")?;
    let mut first = true;
    for (name, value) in set.entries() {
        if !value {
            continue;
        }
        if !first {
            f.write_str(", ")?;
        }
        f.write_str(name)?;
        first = false;
    }
    f.write_str("]")
}

/// Object-safe, string-keyed access to a field-set.
///
/// This is the dynamic surface for code that does not know the concrete
/// type. Reads resolve names against the validated shape; writes always fail
/// because field-sets are immutable.
pub trait FieldAccess {
    /// Name of the concrete type.
    fn type_name(&self) -> &'static str;

    /// Field names in declaration order.
    fn field_names(&self) -> Result<&'static [&'static str]>;

    /// Value of the named field.
    fn get_field(&self, name: &str) -> Result<bool>;

    /// Direct assignment. Always fails with [`Error::Immutable`].
    fn set_field(&mut self, name: &str, value: bool) -> Result<()>;
}

impl<S: FieldSet> FieldAccess for S {
    fn type_name(&self) -> &'static str {
        S::TYPE_NAME
    }

    fn field_names(&self) -> Result<&'static [&'static str]> {
        Ok(S::shape()?.names())
    }

    fn get_field(&self, name: &str) -> Result<bool> {
        self.get(name)
    }

    fn set_field(&mut self, _name: &str, _value: bool) -> Result<()> {
        Err(Error::Immutable(ImmutableTarget::FieldSet(S::KIND)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DefinitionReason;
    use crate::shape::{DeclaredValue, Visibility};

    /// Hand-written field-set: foo and baz default to true.
    #[derive(Clone, Debug, PartialEq, Eq)]
    struct TestFlags {
        foo: bool,
        bar: bool,
        baz: bool,
        qux: bool,
    }

    impl FieldSet for TestFlags {
        const TYPE_NAME: &'static str = "TestFlags";
        const KIND: SetKind = SetKind::Flag;

        fn declaration() -> &'static [FieldDecl] {
            static FIELDS: [FieldDecl; 4] = [
                FieldDecl::flag("foo", true),
                FieldDecl::flag("bar", false),
                FieldDecl::flag("baz", true),
                FieldDecl::flag("qux", false),
            ];
            &FIELDS
        }

        fn registry() -> &'static Registry<Self> {
            static REGISTRY: Registry<TestFlags> = Registry::new();
            &REGISTRY
        }

        fn read(&self, index: usize) -> bool {
            match index {
                0 => self.foo,
                1 => self.bar,
                2 => self.baz,
                3 => self.qux,
                _ => false,
            }
        }

        fn from_bits(bits: &FieldBits) -> Self {
            Self {
                foo: bits.is_set(0),
                bar: bits.is_set(1),
                baz: bits.is_set(2),
                qux: bits.is_set(3),
            }
        }
    }

    impl fmt::Display for TestFlags {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            render(self, f)
        }
    }

    /// Declares a non-boolean field, as a hand-written declaration might.
    #[derive(Clone, Debug)]
    struct NonBooleanFlags;

    impl FieldSet for NonBooleanFlags {
        const TYPE_NAME: &'static str = "NonBooleanFlags";
        const KIND: SetKind = SetKind::Option;

        fn declaration() -> &'static [FieldDecl] {
            static FIELDS: [FieldDecl; 1] = [FieldDecl::new(
                "foo",
                Visibility::Private,
                DeclaredValue::Other("i32"),
            )];
            &FIELDS
        }

        fn registry() -> &'static Registry<Self> {
            static REGISTRY: Registry<NonBooleanFlags> = Registry::new();
            &REGISTRY
        }

        fn read(&self, _index: usize) -> bool {
            false
        }

        fn from_bits(_bits: &FieldBits) -> Self {
            Self
        }
    }

    fn values(flags: &TestFlags) -> [bool; 4] {
        [flags.foo, flags.bar, flags.baz, flags.qux]
    }

    #[test]
    fn test_factories() {
        assert_eq!(values(TestFlags::defaults().unwrap()), [true, false, true, false]);
        assert_eq!(values(TestFlags::all().unwrap()), [true; 4]);
        assert_eq!(values(TestFlags::none().unwrap()), [false; 4]);
    }

    #[test]
    fn test_factories_are_cached() {
        assert!(std::ptr::eq(
            TestFlags::defaults().unwrap(),
            TestFlags::defaults().unwrap()
        ));
        assert!(std::ptr::eq(TestFlags::all().unwrap(), TestFlags::all().unwrap()));
        assert!(std::ptr::eq(TestFlags::none().unwrap(), TestFlags::none().unwrap()));
    }

    #[test]
    fn test_fluent_update() {
        let flags = TestFlags::of("bar", true).unwrap();
        assert_eq!(values(&flags), [true, true, true, false]);

        let changed = flags.with("foo", false).unwrap();
        assert_eq!(values(&changed), [false, true, true, false]);
        // the receiver is unchanged
        assert_eq!(values(&flags), [true, true, true, false]);

        let enabled = TestFlags::none().unwrap().enable("qux").unwrap();
        assert_eq!(values(&enabled), [false, false, false, true]);
        assert_eq!(values(&TestFlags::enabled("bar").unwrap()), [true, true, true, false]);
    }

    #[test]
    fn test_unknown_field() {
        let expected = "The flag-set TestFlags does not have a flag named \"unknown\".";

        let err = TestFlags::of("unknown", true).unwrap_err();
        assert_eq!(err.to_string(), expected);

        let err = TestFlags::defaults().unwrap().with("unknown", true).unwrap_err();
        assert_eq!(err.to_string(), expected);

        let err = TestFlags::defaults().unwrap().get("unknown").unwrap_err();
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_get() {
        let flags = TestFlags::defaults().unwrap();
        assert!(flags.get("foo").unwrap());
        assert!(!flags.get("bar").unwrap());
    }

    #[test]
    fn test_render() {
        assert_eq!(TestFlags::defaults().unwrap().to_string(), "[foo, baz]");
        assert_eq!(TestFlags::none().unwrap().to_string(), "[]");
        assert_eq!(TestFlags::all().unwrap().to_string(), "[foo, bar, baz, qux]");
    }

    #[test]
    fn test_algebra() {
        let defaults = TestFlags::defaults().unwrap();
        let all = TestFlags::all().unwrap();
        let none = TestFlags::none().unwrap();

        assert_eq!(values(&defaults.diff(none)), [true, false, true, false]);
        assert_eq!(values(&defaults.diff(all)), [false; 4]);
        assert_eq!(values(&defaults.symmetric_diff(all)), [false, true, false, true]);
        assert_eq!(values(&defaults.intersect(none)), [false; 4]);
        assert_eq!(values(&defaults.union(all)), [true; 4]);
        assert_eq!(values(&defaults.inverse()), [false, true, false, true]);
    }

    #[test]
    fn test_field_access_is_read_only() {
        let mut flags = TestFlags::defaults().unwrap().clone();
        let access: &mut dyn FieldAccess = &mut flags;

        assert_eq!(access.type_name(), "TestFlags");
        assert_eq!(access.field_names().unwrap(), &["foo", "bar", "baz", "qux"]);
        assert!(access.get_field("baz").unwrap());

        let err = access.set_field("foo", false).unwrap_err();
        assert_eq!(err.to_string(), "Flag-sets are immutable.");
        assert!(flags.foo);
    }

    #[test]
    fn test_rejected_declaration_fails_every_factory() {
        for result in [
            NonBooleanFlags::defaults().map(|_| ()),
            NonBooleanFlags::all().map(|_| ()),
            NonBooleanFlags::none().map(|_| ()),
            NonBooleanFlags::of("foo", true).map(|_| ()),
        ] {
            match result.unwrap_err() {
                Error::Definition {
                    type_name,
                    field,
                    reason,
                    ..
                } => {
                    assert_eq!(type_name, "NonBooleanFlags");
                    assert_eq!(field, "foo");
                    assert_eq!(reason, DefinitionReason::NonBoolean);
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }
}
