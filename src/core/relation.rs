//! Relations - directed, named edges between collections.

use std::fmt;
use std::sync::Arc;

use crate::core::{Collection, Key, Name};

/// A reference from records of a tail collection to records of a head
/// collection, optionally through a specific key of the head.
#[derive(Clone)]
pub struct Relation {
    inner: Arc<RelationInner>,
}

#[derive(Clone)]
struct RelationInner {
    name: Name,
    tail: Collection,
    head: Collection,
    head_key: Option<Key>,
}

impl Relation {
    pub fn new(name: impl Into<Name>, tail: &Collection, head: &Collection) -> Self {
        Relation {
            inner: Arc::new(RelationInner {
                name: name.into(),
                tail: tail.clone(),
                head: head.clone(),
                head_key: None,
            }),
        }
    }

    /// Target a specific key of the head collection.
    pub fn with_head_key(mut self, key: &Key) -> Self {
        Arc::make_mut(&mut self.inner).head_key = Some(key.clone());
        self
    }

    pub fn name(&self) -> Name {
        self.inner.name
    }

    /// The referencing collection.
    pub fn tail_collection(&self) -> &Collection {
        &self.inner.tail
    }

    /// The referenced collection.
    pub fn head_collection(&self) -> &Collection {
        &self.inner.head
    }

    pub fn head_collection_key(&self) -> Option<&Key> {
        self.inner.head_key.as_ref()
    }

    pub fn ptr_eq(&self, other: &Relation) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("name", &self.inner.name)
            .field("tail", &self.inner.tail.name())
            .field("head", &self.inner.head.name())
            .field("head_key", &self.inner.head_key.as_ref().map(Key::name))
            .finish()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} -> {}",
            self.inner.name,
            self.inner.tail.name(),
            self.inner.head.name()
        )?;
        if let Some(key) = &self.inner.head_key {
            write!(f, " via {}", key.name())?;
        }
        write!(f, ")")
    }
}
