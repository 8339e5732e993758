//! Inventory and schema error types.

use std::fmt;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::Name;
use crate::util::diagnostic::Diagnostic;

/// The registry an entity belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Type,
    Collection,
    Relation,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Type => write!(f, "type"),
            EntityKind::Collection => write!(f, "collection"),
            EntityKind::Relation => write!(f, "relation"),
        }
    }
}

/// Which end of a relation a collection sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationEnd {
    Tail,
    Head,
}

impl fmt::Display for RelationEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelationEnd::Tail => write!(f, "tail"),
            RelationEnd::Head => write!(f, "head"),
        }
    }
}

/// A registration rejected by an [`Inventory`](crate::core::Inventory).
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum InventoryError {
    #[error("{kind} of name `{name}` already exists in the inventory")]
    #[diagnostic(
        code(schema_inventory::duplicate_name),
        help("Names must be unique within each registry of an inventory")
    )]
    DuplicateName { kind: EntityKind, name: Name },

    #[error("{end} collection named `{collection}` is not in this inventory")]
    #[diagnostic(
        code(schema_inventory::unknown_collection),
        help("Add the collection before adding relations that use it")
    )]
    UnknownCollection {
        relation: Name,
        end: RelationEnd,
        collection: Name,
    },

    #[error("head collection key `{key}` is not valid for head collection `{collection}`")]
    #[diagnostic(code(schema_inventory::invalid_key))]
    InvalidKey {
        relation: Name,
        key: Name,
        collection: Name,
    },
}

impl InventoryError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            InventoryError::DuplicateName { kind, name } => {
                Diagnostic::error(format!("duplicate {} name `{}`", kind, name))
                    .with_context(format!(
                        "a different {} is already registered as `{}`",
                        kind, name
                    ))
                    .with_suggestion(format!("Rename one of the {}s named `{}`", kind, name))
            }

            InventoryError::UnknownCollection {
                relation,
                end,
                collection,
            } => Diagnostic::error(format!(
                "relation `{}` uses a collection outside this inventory",
                relation
            ))
            .with_context(format!("{} collection `{}` was never added", end, collection))
            .with_suggestion(format!(
                "Add collection `{}` before relation `{}`",
                collection, relation
            )),

            InventoryError::InvalidKey {
                relation,
                key,
                collection,
            } => Diagnostic::error(format!(
                "relation `{}` targets an unknown key of `{}`",
                relation, collection
            ))
            .with_context(format!(
                "key `{}` is not declared by collection `{}`",
                key, collection
            ))
            .with_suggestion(format!(
                "Use one of the keys declared by `{}`, or drop the head key",
                collection
            )),
        }
    }
}

/// An invalid type, collection or key definition.
#[derive(Debug, Clone, PartialEq, Eq, Error, MietteDiagnostic)]
pub enum SchemaError {
    #[error("invalid name `{name}`")]
    #[diagnostic(
        code(schema_inventory::invalid_name),
        help("Names must be non-empty and contain no whitespace")
    )]
    InvalidName { name: String },

    #[error("type `{ty}` is not an object type")]
    #[diagnostic(code(schema_inventory::not_an_object_type))]
    NotAnObjectType { ty: Name },

    #[error("fields of object type `{ty}` are already defined")]
    #[diagnostic(code(schema_inventory::fields_already_defined))]
    FieldsAlreadyDefined { ty: Name },

    #[error("field `{field}` is declared twice on `{ty}`")]
    #[diagnostic(code(schema_inventory::duplicate_field))]
    DuplicateField { ty: Name, field: Name },

    #[error("key `{key}` is declared twice on collection `{collection}`")]
    #[diagnostic(code(schema_inventory::duplicate_key))]
    DuplicateKey { collection: Name, key: Name },

    #[error("key `{key}` of collection `{collection}` has no fields")]
    #[diagnostic(code(schema_inventory::empty_key))]
    EmptyKey { collection: Name, key: Name },

    #[error("key `{key}` of collection `{collection}` references unknown field `{field}`")]
    #[diagnostic(
        code(schema_inventory::unknown_key_field),
        help("Key fields must be fields of the collection's object type")
    )]
    UnknownKeyField {
        collection: Name,
        key: Name,
        field: Name,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = InventoryError::DuplicateName {
            kind: EntityKind::Type,
            name: Name::new("Person"),
        };
        assert_eq!(
            err.to_string(),
            "type of name `Person` already exists in the inventory"
        );

        let err = InventoryError::UnknownCollection {
            relation: Name::new("owner"),
            end: RelationEnd::Head,
            collection: Name::new("people"),
        };
        assert_eq!(
            err.to_string(),
            "head collection named `people` is not in this inventory"
        );
    }

    #[test]
    fn test_invalid_key_diagnostic() {
        let err = InventoryError::InvalidKey {
            relation: Name::new("owner"),
            key: Name::new("pets_pkey"),
            collection: Name::new("people"),
        };

        let output = err.to_diagnostic().format(false);
        assert!(output.contains("error: relation `owner` targets an unknown key of `people`"));
        assert!(output.contains("key `pets_pkey` is not declared"));
        assert!(output.contains("1. Use one of the keys"));
    }
}
