//! Test utilities for schema-inventory unit tests.
//!
//! Fixtures build the small recursive "people" schema most tests use, both as
//! ready-made handles and as manifest text.
//!
//! # Example
//!
//! ```rust,ignore
//! use schema_inventory::test_support::people_collection;
//!
//! #[test]
//! fn test_example() {
//!     let mut inventory = Inventory::new();
//!     inventory.add_collection(&people_collection()).unwrap();
//! }
//! ```

pub mod fixtures;

use std::path::PathBuf;

use tempfile::TempDir;

pub use fixtures::*;

/// Write a manifest into a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub fn write_manifest(contents: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(crate::core::manifest::MANIFEST_NAME);
    std::fs::write(&path, contents).unwrap();
    (dir, path)
}
