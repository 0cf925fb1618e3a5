//! Sources command
//!
//! Show what discovery finds in the configured source directories

use super::load_config;
use crate::ProjectArgs;
use anyhow::{Context, Result};
use xhep_build::{LocalTree, discover_sources};

/// Print the discovered sources and headers
pub(crate) fn run(project: &ProjectArgs) -> Result<()> {
    let config = load_config(project)?;

    let found = discover_sources(&LocalTree, &config.source_paths())
        .context("Failed to discover sources")?;

    println!("Sources ({}):", found.sources.len());
    for source in &found.sources {
        println!("  {}", source.display());
    }

    println!("Headers ({}):", found.headers.len());
    for header in &found.headers {
        println!("  {}", header.display());
    }

    Ok(())
}
