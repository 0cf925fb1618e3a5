//! Clean command
//!
//! Remove the build-output directory

use super::load_config;
use crate::ProjectArgs;
use anyhow::{Context, Result};
use xhep_build::clean_build_output;

/// Remove the build-output tree; a missing tree is not an error
pub(crate) fn run(project: &ProjectArgs) -> Result<()> {
    let config = load_config(project)?;
    let build_dir = config.build_path();

    let removed = clean_build_output(&build_dir).context("Failed to clean build output")?;

    if removed {
        println!("Removed {}", build_dir.display());
    } else {
        println!("Nothing to clean at {}", build_dir.display());
    }

    Ok(())
}
