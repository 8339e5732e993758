//! Command implementations

pub mod check;
pub mod graph;
pub mod list;

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use schema_inventory::core::manifest::MANIFEST_NAME;
use schema_inventory::ops::load_inventory;
use schema_inventory::util::config::{
    global_config_path, load_config, project_config_path, Config,
};
use schema_inventory::util::diagnostic::suggestions;
use schema_inventory::Inventory;

/// The manifest a command works on and the configuration that applies to it.
///
/// Resolved before the command runs, so that errors from the command itself
/// are reported with the configured settings.
pub struct Context {
    pub manifest: PathBuf,
    pub config: Config,
    no_color: bool,
}

impl Context {
    pub fn new(manifest: Option<PathBuf>, config: Option<&Path>, no_color: bool) -> Result<Self> {
        let manifest = manifest.unwrap_or_else(|| PathBuf::from(MANIFEST_NAME));

        let config = match config {
            Some(path) => Config::load(path)?,
            None => {
                let root = manifest.parent().unwrap_or(Path::new("."));
                load_config(global_config_path().as_deref(), &project_config_path(root))
            }
        };

        Ok(Context {
            manifest,
            config,
            no_color,
        })
    }

    /// `--no-color` wins over `[output] color`.
    pub fn color(&self) -> bool {
        !self.no_color && self.config.color()
    }

    /// Load the manifest into an inventory.
    pub fn load(&self) -> Result<Inventory> {
        if !self.manifest.is_file() {
            bail!(
                "could not find manifest {}\n{}",
                self.manifest.display(),
                suggestions::NO_MANIFEST
            );
        }

        load_inventory(&self.manifest, self.config.inventory_options())
    }
}
