//! `schema-inventory graph` command

use anyhow::{bail, Result};

use crate::cli::GraphArgs;
use crate::commands::Context;
use schema_inventory::util::diagnostic::suggestions;
use schema_inventory::CollectionGraph;

pub fn execute(args: GraphArgs, ctx: &Context) -> Result<()> {
    let inventory = ctx.load()?;
    let graph = CollectionGraph::from_inventory(&inventory);

    let Some(start) = args.from else {
        println!("{}", graph.to_dot());
        return Ok(());
    };

    if !graph.contains(&start) {
        bail!(
            "collection `{}` is not declared in {}\n{}",
            start,
            ctx.manifest.display(),
            suggestions::COLLECTION_NOT_FOUND
        );
    }

    for (relation, head) in graph.references(&start) {
        println!("{} -[{}]-> {}", start, relation, head);
    }
    for collection in graph.reachable_from(&start) {
        println!("reachable: {}", collection);
    }

    Ok(())
}
