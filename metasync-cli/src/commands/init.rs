//! `metasync init --origin <url> [--asset-prefix <prefix>]`

use anyhow::{Context, Result};
use clap::Args;

use metasync_core::{config, SyncConfig};

/// Save the application origin to ~/.metasync/config.yaml.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Absolute origin of the application, e.g. https://shop.example.com.
    #[arg(long)]
    pub origin: String,

    /// Path segment between the origin and bundled assets.
    #[arg(long, default_value = config::DEFAULT_ASSET_PREFIX)]
    pub asset_prefix: String,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let cfg = SyncConfig {
            app_origin: self.origin,
            asset_prefix: self.asset_prefix,
        }
        .normalized()?;
        config::save(&cfg).context("failed to save config")?;

        println!("✓ Origin set to {}", cfg.app_origin);
        println!("  Assets resolve to {}/{}/<path>", cfg.app_origin, cfg.asset_prefix);
        println!("  Saved to: ~/.metasync/config.yaml");
        Ok(())
    }
}
