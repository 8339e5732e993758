//! Collections - addressable sets of records - and their keys.

use std::fmt;
use std::sync::Arc;

use crate::core::errors::SchemaError;
use crate::core::{Name, Type};

/// A set of fields that uniquely addresses a record within a collection.
///
/// Keys are compared by identity: a relation must point at the key instance
/// its head collection declares, not merely one with the same name.
#[derive(Clone)]
pub struct Key {
    inner: Arc<KeyInner>,
}

struct KeyInner {
    name: Name,
    fields: Vec<Name>,
}

impl Key {
    pub fn new<N: Into<Name>>(name: impl Into<Name>, fields: impl IntoIterator<Item = N>) -> Self {
        Key {
            inner: Arc::new(KeyInner {
                name: name.into(),
                fields: fields.into_iter().map(Into::into).collect(),
            }),
        }
    }

    pub fn name(&self) -> Name {
        self.inner.name
    }

    /// Field names, in declaration order.
    pub fn fields(&self) -> &[Name] {
        &self.inner.fields
    }

    pub fn ptr_eq(&self, other: &Key) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Key")
            .field("name", &self.inner.name)
            .field("fields", &self.inner.fields)
            .finish()
    }
}

/// A named set of records sharing an optional object type.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<CollectionInner>,
}

struct CollectionInner {
    name: Name,
    object_type: Option<Type>,
    keys: Vec<Key>,
}

impl Collection {
    /// Create a collection without keys.
    pub fn new(name: impl Into<Name>, object_type: Option<Type>) -> Result<Self, SchemaError> {
        Self::builder(name).maybe_object_type(object_type).build()
    }

    pub fn builder(name: impl Into<Name>) -> CollectionBuilder {
        CollectionBuilder {
            name: name.into(),
            object_type: None,
            keys: Vec::new(),
        }
    }

    pub fn name(&self) -> Name {
        self.inner.name
    }

    /// The object type shared by every record, if known.
    pub fn object_type(&self) -> Option<&Type> {
        self.inner.object_type.as_ref()
    }

    /// Declared keys, in declaration order.
    pub fn keys(&self) -> &[Key] {
        &self.inner.keys
    }

    /// Look up a declared key by name.
    pub fn key(&self, name: &str) -> Option<&Key> {
        self.inner.keys.iter().find(|k| k.name() == name)
    }

    /// Returns true if this exact key instance is declared by the collection.
    pub fn has_key(&self, key: &Key) -> bool {
        self.inner.keys.iter().any(|k| k.ptr_eq(key))
    }

    pub fn ptr_eq(&self, other: &Collection) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.inner.name)
            .field("type", &self.inner.object_type.as_ref().map(Type::name))
            .field("keys", &self.inner.keys)
            .finish()
    }
}

/// Builder for [`Collection`], validating keys against the object type.
#[derive(Debug)]
pub struct CollectionBuilder {
    name: Name,
    object_type: Option<Type>,
    keys: Vec<Key>,
}

impl CollectionBuilder {
    pub fn object_type(mut self, ty: Type) -> Self {
        self.object_type = Some(ty);
        self
    }

    pub fn maybe_object_type(mut self, ty: Option<Type>) -> Self {
        self.object_type = ty;
        self
    }

    /// Declare a key over the named fields.
    pub fn key<N: Into<Name>>(
        mut self,
        name: impl Into<Name>,
        fields: impl IntoIterator<Item = N>,
    ) -> Self {
        self.keys.push(Key::new(name, fields));
        self
    }

    pub fn build(self) -> Result<Collection, SchemaError> {
        if let Some(ty) = &self.object_type {
            if !ty.is_object() {
                return Err(SchemaError::NotAnObjectType { ty: ty.name() });
            }
        }

        for (i, key) in self.keys.iter().enumerate() {
            if self.keys[..i].iter().any(|k| k.name() == key.name()) {
                return Err(SchemaError::DuplicateKey {
                    collection: self.name,
                    key: key.name(),
                });
            }

            if key.fields().is_empty() {
                return Err(SchemaError::EmptyKey {
                    collection: self.name,
                    key: key.name(),
                });
            }

            for &field in key.fields() {
                let known = self
                    .object_type
                    .as_ref()
                    .is_some_and(|ty| ty.field(&field).is_some());
                if !known {
                    return Err(SchemaError::UnknownKeyField {
                        collection: self.name,
                        key: key.name(),
                        field,
                    });
                }
            }
        }

        Ok(Collection {
            inner: Arc::new(CollectionInner {
                name: self.name,
                object_type: self.object_type,
                keys: self.keys,
            }),
        })
    }
}
