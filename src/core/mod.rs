//! Core data structures for schema-inventory.
//!
//! This module contains the schema model and the registry built from it:
//! - Interned names
//! - Named types (scalar, alias, object) and type references
//! - Collections with keys, and relations between collections
//! - The `Inventory` registry and its graph view
//! - The TOML schema manifest

pub mod collection;
pub mod errors;
pub mod graph;
pub mod inventory;
pub mod manifest;
pub mod name;
pub mod relation;
pub mod types;

pub use collection::{Collection, CollectionBuilder, Key};
pub use errors::{EntityKind, InventoryError, RelationEnd, SchemaError};
pub use graph::CollectionGraph;
pub use inventory::{ClosureMode, FrozenInventory, Inventory, InventoryOptions};
pub use manifest::{SchemaManifest, TypeExpr};
pub use name::Name;
pub use relation::Relation;
pub use types::{Field, Fields, Type, TypeKind, TypeKindTag, TypeRef};
