//! schema-inventory - a validated registry of a data source's static shape
//!
//! This crate aggregates the named types, collections and relations of a data
//! source into one consistent, queryable graph that schema tooling can build
//! on instead of re-deriving structure from each source.

pub mod core;
pub mod ops;
pub mod util;

/// Test fixtures for schema-inventory unit tests.
///
/// This module is only available when compiling with `--cfg test`.
#[cfg(test)]
pub mod test_support;

pub use core::{
    collection::Collection, collection::Key, errors::InventoryError, errors::SchemaError,
    graph::CollectionGraph, inventory::FrozenInventory, inventory::Inventory,
    inventory::InventoryOptions, name::Name, relation::Relation, types::Field, types::Type,
    types::TypeRef,
};
pub use util::config::Config;
