//! `schema-inventory list` command

use anyhow::Result;

use crate::cli::ListArgs;
use crate::commands::Context;
use schema_inventory::ops::{InventoryReport, Sections};
use schema_inventory::util::OutputFormat;

pub fn execute(args: ListArgs, ctx: &Context) -> Result<()> {
    let inventory = ctx.load()?;

    let sections = Sections::from_flags(args.types, args.collections, args.relations);
    let report = InventoryReport::from_inventory(&inventory, sections);

    match args.format.unwrap_or(ctx.config.output_format()) {
        OutputFormat::Text => print!("{}", report.to_text()),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
