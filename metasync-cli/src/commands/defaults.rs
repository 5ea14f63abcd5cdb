//! `metasync defaults --head <head.json>`: the page's own title and description.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use metasync_sync::page_defaults;

use super::load_head;

/// Arguments for `metasync defaults`.
#[derive(Args, Debug)]
pub struct DefaultsArgs {
    /// Head snapshot (JSON).
    #[arg(long)]
    pub head: PathBuf,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl DefaultsArgs {
    pub fn run(self) -> Result<()> {
        let mut head = load_head(&self.head)?;
        let defaults = page_defaults(&mut head);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&defaults)?);
            return Ok(());
        }
        if defaults.is_empty() {
            println!("No default title or description.");
            return Ok(());
        }
        for (key, value) in &defaults {
            println!("{key}: {value}");
        }
        Ok(())
    }
}
