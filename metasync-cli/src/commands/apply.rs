//! `metasync apply`: replay routes against a head snapshot.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use metasync_core::MemoryHead;
use metasync_sync::{Synchronizer, UpdateReport, WriteResult};

use super::{load_head, load_routes, resolve_config};

/// Arguments for `metasync apply`.
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Head snapshot (JSON) as the server delivers it.
    #[arg(long)]
    pub head: PathBuf,

    /// Routes (YAML), applied in file order.
    #[arg(long)]
    pub routes: PathBuf,

    /// Application origin; defaults to the one saved by `metasync init`.
    #[arg(long)]
    pub origin: Option<String>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct RouteReportJson<'a> {
    name: &'a str,
    report: &'a UpdateReport,
}

#[derive(Serialize)]
struct ApplyReportJson<'a> {
    routes: Vec<RouteReportJson<'a>>,
    head: &'a MemoryHead,
}

impl ApplyArgs {
    pub fn run(self) -> Result<()> {
        let cfg = resolve_config(self.origin.as_deref())?;
        let head = load_head(&self.head)?;
        let routes = load_routes(&self.routes)?;

        let mut sync = Synchronizer::new(head, cfg);
        let reports: Vec<UpdateReport> = routes.iter().map(|r| sync.update(&r.meta)).collect();

        if self.json {
            let json = ApplyReportJson {
                routes: routes
                    .iter()
                    .zip(&reports)
                    .map(|(route, report)| RouteReportJson {
                        name: &route.name,
                        report,
                    })
                    .collect(),
                head: sync.head(),
            };
            println!("{}", serde_json::to_string_pretty(&json)?);
            return Ok(());
        }

        for (route, report) in routes.iter().zip(&reports) {
            print_report(&route.name, report);
        }
        println!();
        print!("{}", sync.head().to_markup());
        Ok(())
    }
}

fn print_report(route: &str, report: &UpdateReport) {
    println!(
        "▸ '{}' ({} changed, {} keys)",
        route.bold(),
        report.changed(),
        report.results.len()
    );
    for result in &report.results {
        match result {
            WriteResult::Written { key } => println!("  {}  {key}", "✎".green()),
            WriteResult::Restored { key } => println!("  {}  {key}", "↺".cyan()),
            WriteResult::Unchanged { key } => println!("  {}  {key}", "·".dimmed()),
            WriteResult::Failed { key, error } => {
                println!("  {}  {key}: {error}", "✗".red())
            }
        }
    }
}
