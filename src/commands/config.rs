//! Config command
//!
//! Print the configuration a build would use after files, environment and
//! defaults are merged

use super::load_config;
use crate::ProjectArgs;
use anyhow::{Context, Result};

/// Show the resolved configuration as TOML or JSON
pub(crate) fn run(project: &ProjectArgs, json: bool) -> Result<()> {
    let config = load_config(project)?;

    if json {
        let rendered =
            serde_json::to_string_pretty(&config).context("Failed to serialize configuration")?;
        println!("{rendered}");
    } else {
        let rendered = config.to_toml().context("Failed to serialize configuration")?;
        println!("# project root: {}", config.root.display());
        print!("{rendered}");
    }

    Ok(())
}
