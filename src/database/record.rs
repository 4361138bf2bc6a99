use std::marker::PhantomData;

use surrealdb::opt::IntoResource;
use surrealdb::sql::Id;

use super::{Table, Thing};

/// A record id that remembers which table it belongs to.
///
/// Deserializing fails when the stored id points at another table than `T::table()`.
pub struct Record<T> {
    thing: Thing,
    table: PhantomData<T>,
}

impl<T: Table> Record<T> {
    pub fn new(id: impl Into<Id>) -> Self {
        Self::from_thing(Thing {
            tb: T::table().to_string(),
            id: id.into(),
        })
    }

    /// A fresh id made of a random uuid in its 32 digit form.
    pub fn uuid() -> Self {
        Self::new(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl<T> Record<T> {
    fn from_thing(thing: Thing) -> Self {
        Record {
            thing,
            table: PhantomData,
        }
    }

    /// The identifier without the table prefix, as clients address the record.
    pub fn key(&self) -> String {
        match &self.thing.id {
            Id::String(key) => key.clone(),
            other => other.to_string(),
        }
    }
}

impl<T> std::ops::Deref for Record<T> {
    type Target = Thing;

    fn deref(&self) -> &Thing {
        &self.thing
    }
}

impl<T> std::fmt::Debug for Record<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.thing)
    }
}

impl<T> std::fmt::Display for Record<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.thing)
    }
}

impl<T> Clone for Record<T> {
    fn clone(&self) -> Self {
        Self::from_thing(self.thing.clone())
    }
}

impl<T> PartialEq for Record<T> {
    fn eq(&self, other: &Self) -> bool {
        self.thing == other.thing
    }
}

impl<T> serde::Serialize for Record<T> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.thing.serialize(serializer)
    }
}

impl<'de, T: Table> serde::Deserialize<'de> for Record<T> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let thing = Thing::deserialize(deserializer)?;

        if thing.tb != T::table() {
            return Err(serde::de::Error::custom(format!(
                "record `{thing}` does not belong to table `{}`",
                T::table()
            )));
        }

        Ok(Self::from_thing(thing))
    }
}

impl<T, R> IntoResource<R> for Record<T>
where
    Thing: IntoResource<R>,
{
    fn into_resource(self) -> surrealdb::Result<surrealdb::opt::Resource> {
        self.thing.into_resource()
    }
}
