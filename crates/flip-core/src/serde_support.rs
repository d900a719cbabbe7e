//! Serde support for field-sets and option collections.
//!
//! Both serialise as a map of name (or member key) to boolean covering every
//! field (or member). Deserialising a field-set starts from its defaults;
//! deserialising a collection starts from an empty one. Unknown names are
//! rejected.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::enumeration::Enumeration;
use crate::field_set::FieldSet;
use crate::option_collection::{self, OptionCollection};

/// Serialise a field-set as `{ name: bool, .. }` in declaration order.
///
/// Used by the `Serialize` impl the derives generate.
pub fn serialize_field_set<S, T>(set: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: FieldSet,
{
    let mut map = serializer.serialize_map(Some(T::declaration().len()))?;
    for (name, value) in set.entries() {
        map.serialize_entry(name, &value)?;
    }
    map.end()
}

/// Deserialise a field-set from a (possibly partial) map of name to bool.
///
/// Used by the `Deserialize` impl the derives generate.
pub fn deserialize_field_set<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FieldSet,
{
    deserializer.deserialize_map(FieldSetVisitor(PhantomData))
}

struct FieldSetVisitor<T>(PhantomData<fn() -> T>);

impl<'de, T: FieldSet> Visitor<'de> for FieldSetVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map of {} names to booleans", T::KIND.noun())
    }

    fn visit_map<A>(self, mut access: A) -> Result<T, A::Error>
    where
        A: MapAccess<'de>,
    {
        let shape = T::shape().map_err(de::Error::custom)?;
        let defaults = T::defaults().map_err(de::Error::custom)?;
        let mut bits = defaults.to_bits();

        while let Some((name, value)) = access.next_entry::<String, bool>()? {
            let index = shape.index_of(&name).map_err(de::Error::custom)?;
            bits.set(index, value);
        }

        Ok(T::from_bits(&bits))
    }
}

impl<E: Enumeration> Serialize for OptionCollection<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(E::members().len()))?;
        for (member, state) in self {
            map.serialize_entry(member.key(), &state)?;
        }
        map.end()
    }
}

impl<'de, E: Enumeration> Deserialize<'de> for OptionCollection<E> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CollectionVisitor(PhantomData))
    }
}

struct CollectionVisitor<E>(PhantomData<fn() -> E>);

impl<'de, E: Enumeration> Visitor<'de> for CollectionVisitor<E> {
    type Value = OptionCollection<E>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a map of {} keys to booleans", E::NAME)
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut collection = OptionCollection::create().map_err(de::Error::custom)?;

        while let Some((key, state)) = access.next_entry::<String, bool>()? {
            let member = option_collection::member_by_key::<E>(&key).map_err(de::Error::custom)?;
            collection = collection.set(member, state);
        }

        Ok(collection)
    }
}
