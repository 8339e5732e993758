//! Named types - the nodes of a schema's type graph.
//!
//! A [`Type`] is a cheap-to-clone handle. Two handles are the *same* type only
//! when they point at the same allocation; two separately constructed types
//! with identical names and shapes are still different types. The inventory
//! relies on this to tell a re-registration apart from a name collision.
//!
//! Object types may be created before their fields are known and defined
//! later with [`Type::define_fields`]. This is what makes recursive schemas
//! (`Person { bestFriend: Person }`) expressible. Such schemas form reference
//! cycles and live for the rest of the process, like the interned names they
//! are addressed by.

use std::fmt;
use std::sync::{Arc, OnceLock};

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::core::errors::SchemaError;
use crate::core::Name;

/// Ordered mapping from field name to field.
pub type Fields = IndexMap<Name, Field>;

/// A handle to a named type.
#[derive(Clone)]
pub struct Type {
    inner: Arc<TypeInner>,
}

struct TypeInner {
    name: Name,
    description: Option<String>,
    kind: TypeKind,
}

/// What a named type is made of.
pub enum TypeKind {
    /// An opaque leaf type.
    Scalar,
    /// A transparent synonym for another type.
    Alias(TypeRef),
    /// Named fields; empty until defined.
    Object(OnceLock<Fields>),
}

/// The discriminant of a [`TypeKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKindTag {
    Scalar,
    Alias,
    Object,
}

impl Type {
    fn with_kind(name: impl Into<Name>, description: Option<String>, kind: TypeKind) -> Self {
        Type {
            inner: Arc::new(TypeInner {
                name: name.into(),
                description,
                kind,
            }),
        }
    }

    /// Create a leaf type.
    pub fn scalar(name: impl Into<Name>) -> Self {
        Self::with_kind(name, None, TypeKind::Scalar)
    }

    /// Create an alias for `base`.
    pub fn alias(name: impl Into<Name>, base: impl Into<TypeRef>) -> Self {
        Self::with_kind(name, None, TypeKind::Alias(base.into()))
    }

    /// Create an object type whose fields are defined later.
    pub fn object(name: impl Into<Name>) -> Self {
        Self::with_kind(name, None, TypeKind::Object(OnceLock::new()))
    }

    /// Create an object type with its fields.
    pub fn object_with_fields<N, F>(
        name: impl Into<Name>,
        fields: impl IntoIterator<Item = (N, F)>,
    ) -> Result<Self, SchemaError>
    where
        N: Into<Name>,
        F: Into<Field>,
    {
        let ty = Self::object(name);
        ty.define_fields(fields)?;
        Ok(ty)
    }

    /// Attach a description.
    ///
    /// Only takes effect while this is the sole handle to the type. Once the
    /// handle has been cloned the type is left unchanged, since other holders
    /// must keep seeing the same instance.
    pub fn with_description(self, description: impl Into<String>) -> Self {
        match Arc::try_unwrap(self.inner) {
            Ok(mut inner) => {
                inner.description = Some(description.into());
                Type {
                    inner: Arc::new(inner),
                }
            }
            Err(inner) => Type { inner },
        }
    }

    /// Define the fields of an object type. Can only be done once.
    pub fn define_fields<N, F>(
        &self,
        fields: impl IntoIterator<Item = (N, F)>,
    ) -> Result<(), SchemaError>
    where
        N: Into<Name>,
        F: Into<Field>,
    {
        let TypeKind::Object(slot) = &self.inner.kind else {
            return Err(SchemaError::NotAnObjectType { ty: self.name() });
        };

        if slot.get().is_some() {
            return Err(SchemaError::FieldsAlreadyDefined { ty: self.name() });
        }

        let mut map = Fields::new();
        for (name, field) in fields {
            match map.entry(name.into()) {
                Entry::Occupied(entry) => {
                    return Err(SchemaError::DuplicateField {
                        ty: self.name(),
                        field: *entry.key(),
                    });
                }
                Entry::Vacant(entry) => {
                    entry.insert(field.into());
                }
            }
        }

        slot.set(map)
            .map_err(|_| SchemaError::FieldsAlreadyDefined { ty: self.name() })
    }

    /// Get the type name.
    pub fn name(&self) -> Name {
        self.inner.name
    }

    /// Get the description, if any.
    pub fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Get the kind.
    pub fn kind(&self) -> &TypeKind {
        &self.inner.kind
    }

    pub fn kind_tag(&self) -> TypeKindTag {
        match self.inner.kind {
            TypeKind::Scalar => TypeKindTag::Scalar,
            TypeKind::Alias(_) => TypeKindTag::Alias,
            TypeKind::Object(_) => TypeKindTag::Object,
        }
    }

    pub fn is_object(&self) -> bool {
        matches!(self.inner.kind, TypeKind::Object(_))
    }

    /// The aliased type, for alias types.
    pub fn base_type(&self) -> Option<&TypeRef> {
        match &self.inner.kind {
            TypeKind::Alias(base) => Some(base),
            _ => None,
        }
    }

    /// Fields in declaration order. Empty for non-object types and for
    /// object types whose fields are not defined yet.
    pub fn fields(&self) -> impl Iterator<Item = (&Name, &Field)> {
        self.defined_fields().into_iter().flatten()
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.defined_fields().and_then(|fields| fields.get(name))
    }

    fn defined_fields(&self) -> Option<&Fields> {
        match &self.inner.kind {
            TypeKind::Object(slot) => slot.get(),
            _ => None,
        }
    }

    /// The types this type is directly composed of: the named type behind an
    /// alias base, or behind each field in declaration order.
    pub fn dependencies(&self) -> Vec<&Type> {
        match &self.inner.kind {
            TypeKind::Scalar => Vec::new(),
            TypeKind::Alias(base) => vec![base.named_type()],
            TypeKind::Object(_) => self
                .fields()
                .map(|(_, field)| field.type_ref().named_type())
                .collect(),
        }
    }

    /// Returns true if both handles refer to the same type instance.
    pub fn ptr_eq(&self, other: &Type) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

// Printed by name only: the type graph may be cyclic.
impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Type");
        s.field("name", &self.inner.name.as_str())
            .field("kind", &self.kind_tag());
        match &self.inner.kind {
            TypeKind::Scalar => {}
            TypeKind::Alias(base) => {
                s.field("base", &format_args!("{}", base));
            }
            TypeKind::Object(_) => {
                let fields: Vec<String> = self
                    .fields()
                    .map(|(name, field)| format!("{}: {}", name, field.type_ref()))
                    .collect();
                s.field("fields", &fields);
            }
        }
        s.finish()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner.name, f)
    }
}

/// A reference to a named type, possibly wrapped in modifiers.
#[derive(Clone)]
pub enum TypeRef {
    Named(Type),
    Nullable(Box<TypeRef>),
    List(Box<TypeRef>),
}

impl TypeRef {
    pub fn nullable(inner: impl Into<TypeRef>) -> Self {
        TypeRef::Nullable(Box::new(inner.into()))
    }

    pub fn list(inner: impl Into<TypeRef>) -> Self {
        TypeRef::List(Box::new(inner.into()))
    }

    /// Strip all modifiers and return the underlying named type.
    pub fn named_type(&self) -> &Type {
        let mut current = self;
        loop {
            match current {
                TypeRef::Named(ty) => return ty,
                TypeRef::Nullable(inner) | TypeRef::List(inner) => current = inner,
            }
        }
    }
}

impl From<Type> for TypeRef {
    fn from(ty: Type) -> Self {
        TypeRef::Named(ty)
    }
}

impl From<&Type> for TypeRef {
    fn from(ty: &Type) -> Self {
        TypeRef::Named(ty.clone())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Named(ty) => write!(f, "{}", ty.name()),
            TypeRef::Nullable(inner) => write!(f, "{}?", inner),
            TypeRef::List(inner) => write!(f, "[{}]", inner),
        }
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self)
    }
}

/// A field of an object type.
#[derive(Clone)]
pub struct Field {
    type_ref: TypeRef,
    description: Option<String>,
}

impl Field {
    pub fn new(type_ref: impl Into<TypeRef>) -> Self {
        Field {
            type_ref: type_ref.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl From<TypeRef> for Field {
    fn from(type_ref: TypeRef) -> Self {
        Field::new(type_ref)
    }
}

impl From<Type> for Field {
    fn from(ty: Type) -> Self {
        Field::new(ty)
    }
}

impl From<&Type> for Field {
    fn from(ty: &Type) -> Self {
        Field::new(ty)
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("type", &format_args!("{}", self.type_ref))
            .field("description", &self.description)
            .finish()
    }
}
