//! schema-inventory CLI - validate and explore schema manifests

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use schema_inventory::util::diagnostic::{self, Diagnostic};
use schema_inventory::InventoryError;

fn main() {
    let cli = Cli::parse();
    let mut color = !cli.no_color;

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("schema_inventory=debug")
    } else {
        EnvFilter::new("schema_inventory=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli, &mut color) {
        diagnostic::emit(&to_diagnostic(&e), color);
        std::process::exit(1);
    }
}

/// Run the command. `color` is updated once the configuration is known.
fn run(cli: Cli, color: &mut bool) -> Result<()> {
    let ctx = commands::Context::new(
        cli.command.manifest().map(Path::to_path_buf),
        cli.config.as_deref(),
        cli.no_color,
    )?;
    *color = ctx.color();

    match cli.command {
        Commands::Check(_) => commands::check::execute(&ctx),
        Commands::List(args) => commands::list::execute(args, &ctx),
        Commands::Graph(args) => commands::graph::execute(args, &ctx),
    }
}

/// Registration failures get their structured diagnostic; everything else is
/// reported as its context chain.
fn to_diagnostic(error: &anyhow::Error) -> Diagnostic {
    let mut outer = Vec::new();
    for cause in error.chain() {
        if let Some(inventory_error) = cause.downcast_ref::<InventoryError>() {
            return outer
                .into_iter()
                .fold(inventory_error.to_diagnostic(), Diagnostic::with_context);
        }
        outer.push(cause.to_string());
    }

    let mut causes = outer.into_iter();
    let message = causes.next().unwrap_or_default();
    causes.fold(Diagnostic::error(message), |diag, cause| {
        diag.with_context(format!("caused by: {}", cause))
    })
}
