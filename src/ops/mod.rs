//! High-level operations built on the inventory core.
//!
//! The core knows nothing about files; these operations load schema
//! manifests into inventories and summarize inventories for output.

pub mod load;
pub mod report;

pub use load::{build_inventory, load_inventory};
pub use report::{InventoryReport, Sections};
