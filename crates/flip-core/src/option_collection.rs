//! Immutable maps from enumeration members to boolean state.

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::Index;

use crate::bits::FieldBits;
use crate::enumeration::{self, Enumeration, Options};
use crate::error::{Error, ImmutableTarget, Result};

/// A map of enumeration member to boolean state.
///
/// Only the members mapped to `true` are stored; every other member of `E`
/// reads as `false`. Collections are immutable: [`OptionCollection::set`]
/// returns a new collection.
pub struct OptionCollection<E: Enumeration> {
    true_set: FieldBits,
    members: PhantomData<fn() -> E>,
}

impl<E: Enumeration> OptionCollection<E> {
    /// An empty collection bound to `E`.
    ///
    /// Fails with [`Error::InvalidType`] if `E` does not honour the
    /// enumeration contract.
    pub fn create() -> Result<Self> {
        enumeration::validate::<E>()?;
        Ok(Self {
            true_set: FieldBits::empty(E::members().len()),
            members: PhantomData,
        })
    }

    /// State of `member`.
    pub fn get(&self, member: E) -> bool {
        self.true_set.is_set(member.ordinal())
    }

    /// Copy of this collection with `member` set to `state`.
    #[must_use]
    pub fn set(&self, member: E, state: bool) -> Self {
        Self {
            true_set: self.true_set.with(member.ordinal(), state),
            members: PhantomData,
        }
    }

    /// State of a member given without its static type.
    ///
    /// Fails with [`Error::TypeMismatch`] unless `member` is an `E`.
    pub fn get_any(&self, member: &dyn Any) -> Result<bool> {
        Ok(self.get(Self::downcast(member)?))
    }

    /// [`OptionCollection::set`] for a member given without its static type.
    ///
    /// Fails with [`Error::TypeMismatch`] unless `member` is an `E`.
    pub fn set_any(&self, member: &dyn Any, state: bool) -> Result<Self> {
        Ok(self.set(Self::downcast(member)?, state))
    }

    /// True if `probe` is a member of `E`, whatever its state.
    pub fn contains_key(&self, probe: &dyn Any) -> bool {
        probe.is::<E>()
    }

    /// Every member of `E` with its state, in canonical order.
    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            collection: self,
            members: E::members().iter(),
        }
    }

    /// Members whose state is `true`, in canonical order.
    pub fn enabled(&self) -> impl Iterator<Item = E> + '_ {
        self.iter()
            .filter_map(|(member, state)| state.then_some(member))
    }

    /// Number of members whose state is `true`.
    pub fn count_enabled(&self) -> usize {
        self.true_set.count()
    }

    fn downcast(member: &dyn Any) -> Result<E> {
        member
            .downcast_ref::<E>()
            .copied()
            .ok_or(Error::TypeMismatch { expected: E::NAME })
    }
}

impl<E: Options> OptionCollection<E> {
    /// Build a collection from `E`'s declared defaults overridden by `options`.
    pub fn build(options: impl IntoIterator<Item = (E, bool)>) -> Result<Self> {
        Self::build_with_defaults(options, E::defaults().iter().copied())
    }

    /// Build a collection from `defaults` overridden by `options`.
    ///
    /// Both passes apply their entries in order, so a later entry for the
    /// same member wins.
    pub fn build_with_defaults(
        options: impl IntoIterator<Item = (E, bool)>,
        defaults: impl IntoIterator<Item = (E, bool)>,
    ) -> Result<Self> {
        let mut result = Self::create()?;
        for (member, state) in defaults.into_iter().chain(options) {
            result = result.set(member, state);
        }
        Ok(result)
    }

    /// [`OptionCollection::build`] with members named by key.
    ///
    /// Fails with [`Error::UnknownMember`] for a key no member uses.
    pub fn build_by_key<'a>(options: impl IntoIterator<Item = (&'a str, bool)>) -> Result<Self> {
        Self::build(resolve_keys::<E>(options)?)
    }

    /// [`OptionCollection::build_with_defaults`] with members named by key.
    ///
    /// Fails with [`Error::UnknownMember`] for a key no member uses, in
    /// either list.
    pub fn build_with_defaults_by_key<'a, 'b>(
        options: impl IntoIterator<Item = (&'a str, bool)>,
        defaults: impl IntoIterator<Item = (&'b str, bool)>,
    ) -> Result<Self> {
        Self::build_with_defaults(resolve_keys::<E>(options)?, resolve_keys::<E>(defaults)?)
    }
}

fn resolve_keys<'a, E: Enumeration>(
    entries: impl IntoIterator<Item = (&'a str, bool)>,
) -> Result<Vec<(E, bool)>> {
    entries
        .into_iter()
        .map(|(key, state)| Ok((member_by_key::<E>(key)?, state)))
        .collect()
}

pub(crate) fn member_by_key<E: Enumeration>(key: &str) -> Result<E> {
    E::member_by_key(key).ok_or_else(|| Error::UnknownMember {
        type_name: E::NAME,
        key: key.to_string(),
    })
}

impl<E: Enumeration> Clone for OptionCollection<E> {
    fn clone(&self) -> Self {
        Self {
            true_set: self.true_set.clone(),
            members: PhantomData,
        }
    }
}

impl<E: Enumeration> PartialEq for OptionCollection<E> {
    fn eq(&self, other: &Self) -> bool {
        self.true_set == other.true_set
    }
}

impl<E: Enumeration> Eq for OptionCollection<E> {}

impl<E: Enumeration> Hash for OptionCollection<E> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.true_set.hash(state);
    }
}

impl<E: Enumeration> fmt::Debug for OptionCollection<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OptionCollection<{}> ", E::NAME)?;
        f.debug_map()
            .entries(self.iter().map(|(member, state)| (member.key(), state)))
            .finish()
    }
}

impl<E: Enumeration> Index<E> for OptionCollection<E> {
    type Output = bool;

    fn index(&self, member: E) -> &bool {
        if self.get(member) { &true } else { &false }
    }
}

impl<'a, E: Enumeration> IntoIterator for &'a OptionCollection<E> {
    type Item = (E, bool);
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over `(member, state)` pairs of an [`OptionCollection`].
pub struct Iter<'a, E: Enumeration> {
    collection: &'a OptionCollection<E>,
    members: std::slice::Iter<'static, E>,
}

impl<E: Enumeration> Iterator for Iter<'_, E> {
    type Item = (E, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let member = *self.members.next()?;
        Some((member, self.collection.get(member)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.members.size_hint()
    }
}

impl<E: Enumeration> ExactSizeIterator for Iter<'_, E> {}

impl<E: Enumeration> FusedIterator for Iter<'_, E> {}

/// Object-safe, key/value access to an option collection.
///
/// Keys are members passed as `&dyn Any`; a key of the wrong type is a
/// [`Error::TypeMismatch`]. Writes and deletes always fail because
/// collections are immutable.
pub trait MemberAccess {
    /// Name of the bound enumeration.
    fn enumeration_name(&self) -> &'static str;

    /// True if `probe` is a member of the bound enumeration.
    fn contains_member(&self, probe: &dyn Any) -> bool;

    /// State of `member`.
    fn get_member(&self, member: &dyn Any) -> Result<bool>;

    /// Indexed write. Always fails with [`Error::Immutable`].
    fn set_member(&mut self, member: &dyn Any, state: bool) -> Result<()>;

    /// Indexed delete. Always fails with [`Error::Immutable`].
    fn remove_member(&mut self, member: &dyn Any) -> Result<()>;
}

impl<E: Enumeration> MemberAccess for OptionCollection<E> {
    fn enumeration_name(&self) -> &'static str {
        E::NAME
    }

    fn contains_member(&self, probe: &dyn Any) -> bool {
        self.contains_key(probe)
    }

    fn get_member(&self, member: &dyn Any) -> Result<bool> {
        self.get_any(member)
    }

    fn set_member(&mut self, _member: &dyn Any, _state: bool) -> Result<()> {
        Err(Error::Immutable(ImmutableTarget::OptionCollection))
    }

    fn remove_member(&mut self, _member: &dyn Any) -> Result<()> {
        Err(Error::Immutable(ImmutableTarget::OptionCollection))
    }
}
