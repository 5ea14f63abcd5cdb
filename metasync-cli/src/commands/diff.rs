//! `metasync diff`: show what replaying routes does to the head.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use metasync_core::Metadata;
use metasync_sync::diff::preview;

use super::{load_head, load_routes, resolve_config};

/// Arguments for `metasync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Head snapshot (JSON).
    #[arg(long)]
    pub head: PathBuf,

    /// Routes (YAML), applied in file order.
    #[arg(long)]
    pub routes: PathBuf,

    /// Application origin; defaults to the one saved by `metasync init`.
    #[arg(long)]
    pub origin: Option<String>,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let cfg = resolve_config(self.origin.as_deref())?;
        let head = load_head(&self.head)?;
        let routes: Vec<Metadata> = load_routes(&self.routes)?
            .into_iter()
            .map(|r| r.meta)
            .collect();

        let result = preview(&head, &cfg, &routes);
        if result.unified_diff.is_empty() {
            println!("No differences for '{}'.", self.head.display());
            return Ok(());
        }

        print!("{}", result.unified_diff);
        if !result.unified_diff.ends_with('\n') {
            println!();
        }
        Ok(())
    }
}
