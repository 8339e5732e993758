//! Interned schema identifiers.
//!
//! Every type, field, collection, key and relation is addressed by a `Name`.
//! Names are interned once and then compared by pointer, so registries keyed
//! by name stay cheap no matter how large the schema grows.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{LazyLock, PoisonError, RwLock};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::core::errors::SchemaError;

/// Global name interner
static NAMES: LazyLock<RwLock<HashSet<&'static str>>> =
    LazyLock::new(|| RwLock::new(HashSet::new()));

/// An interned identifier.
///
/// Two names with the same text always share one allocation, so equality is
/// a pointer comparison. Hashing goes through the text so that maps keyed by
/// `Name` can be queried with a plain `&str`.
#[derive(Clone, Copy)]
pub struct Name {
    inner: &'static str,
}

impl Name {
    /// Intern a name without validating it.
    pub fn new(s: impl AsRef<str>) -> Self {
        let s = s.as_ref();

        {
            let names = NAMES.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(&interned) = names.get(s) {
                return Name { inner: interned };
            }
        }

        let mut names = NAMES.write().unwrap_or_else(PoisonError::into_inner);

        // Another writer may have won the race
        if let Some(&interned) = names.get(s) {
            return Name { inner: interned };
        }

        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        names.insert(leaked);

        Name { inner: leaked }
    }

    /// Intern a name, rejecting empty names and names containing whitespace.
    pub fn parse(s: impl AsRef<str>) -> Result<Self, SchemaError> {
        let s = s.as_ref();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            return Err(SchemaError::InvalidName {
                name: s.to_owned(),
            });
        }
        Ok(Name::new(s))
    }

    /// Get the underlying string slice.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.inner
    }
}

impl Deref for Name {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.inner
    }
}

impl AsRef<str> for Name {
    #[inline]
    fn as_ref(&self) -> &str {
        self.inner
    }
}

impl Borrow<str> for Name {
    #[inline]
    fn borrow(&self) -> &str {
        self.inner
    }
}

impl PartialEq for Name {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.inner, other.inner)
    }
}

impl Eq for Name {}

impl PartialEq<str> for Name {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

impl PartialEq<&str> for Name {
    fn eq(&self, other: &&str) -> bool {
        self.inner == *other
    }
}

impl PartialOrd for Name {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Name {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(other.inner)
    }
}

impl Hash for Name {
    // Must agree with `str`'s hash because of the `Borrow<str>` impl.
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state)
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.inner, f)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.inner, f)
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Name::new(s)
    }
}

impl From<&String> for Name {
    fn from(s: &String) -> Self {
        Name::new(s)
    }
}

impl Serialize for Name {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.inner.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Name {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Name::parse(s).map_err(serde::de::Error::custom)
    }
}
