//! CLI definitions using clap.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

use schema_inventory::util::OutputFormat;

/// schema-inventory - validate and explore schema manifests
#[derive(Parser)]
#[command(name = "schema-inventory")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Use this config file instead of the global and project ones
    #[arg(long, global = true, env = "SCHEMA_INVENTORY_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate a manifest and report what it contains
    Check(CheckArgs),

    /// List the types, collections and relations of a manifest
    List(ListArgs),

    /// Show the relation graph between collections
    Graph(GraphArgs),
}

impl Commands {
    /// The manifest path given on the command line, if any.
    pub fn manifest(&self) -> Option<&Path> {
        match self {
            Commands::Check(args) => args.manifest.as_deref(),
            Commands::List(args) => args.manifest.as_deref(),
            Commands::Graph(args) => args.manifest.as_deref(),
        }
    }
}

#[derive(Args)]
pub struct CheckArgs {
    /// Path to the manifest (defaults to ./Schema.toml)
    pub manifest: Option<PathBuf>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Path to the manifest (defaults to ./Schema.toml)
    pub manifest: Option<PathBuf>,

    /// Only list types
    #[arg(long)]
    pub types: bool,

    /// Only list collections
    #[arg(long)]
    pub collections: bool,

    /// Only list relations
    #[arg(long)]
    pub relations: bool,

    /// Output format (text, json)
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Path to the manifest (defaults to ./Schema.toml)
    pub manifest: Option<PathBuf>,

    /// List the collections reachable from this one instead of printing DOT
    #[arg(long, value_name = "COLLECTION")]
    pub from: Option<String>,
}
