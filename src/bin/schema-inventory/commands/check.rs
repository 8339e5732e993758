//! `schema-inventory check` command

use anyhow::Result;

use crate::commands::Context;
use schema_inventory::util::diagnostic::{emit, Diagnostic};
use schema_inventory::CollectionGraph;

pub fn execute(ctx: &Context) -> Result<()> {
    let inventory = ctx.load()?;

    let untyped: Vec<String> = inventory
        .collections()
        .filter(|c| c.object_type().is_none())
        .map(|c| c.name().to_string())
        .collect();
    if !untyped.is_empty() {
        let diag = Diagnostic::warning(format!(
            "{} collection(s) without an object type",
            untyped.len()
        ))
        .with_location(&ctx.manifest)
        .with_context(untyped.join(", "));
        emit(&diag, ctx.color());
    }

    let graph = CollectionGraph::from_inventory(&inventory);

    println!(
        "Checked {}: {} types, {} collections, {} relations{}",
        ctx.manifest.display(),
        inventory.type_count(),
        inventory.collection_count(),
        inventory.relation_count(),
        if graph.is_cyclic() {
            " (relation graph has cycles)"
        } else {
            ""
        }
    );

    Ok(())
}
