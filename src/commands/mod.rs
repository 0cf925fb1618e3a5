//! Command handlers for the `xhep-build` binary

pub(crate) mod build;
pub(crate) mod clean;
pub(crate) mod completion;
pub(crate) mod config;
pub(crate) mod sources;

use crate::ProjectArgs;
use anyhow::{Context, Result};
use std::path::PathBuf;
use xhep_build::BuildConfig;

/// Resolve the project root and load its configuration.
pub(crate) fn load_config(project: &ProjectArgs) -> Result<BuildConfig> {
    let root = match &project.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let root: PathBuf = std::path::absolute(&root)
        .with_context(|| format!("Invalid project root: {}", root.display()))?;

    BuildConfig::load(&root, project.config.as_deref())
        .context("Failed to load build configuration")
}
