//! Museum collection report: load, summarize, compare
//!
//! This example demonstrates:
//! - The four museum presets (or a JSON config)
//! - Per-collection failure isolation
//! - JSON output for a downstream renderer
//!
//! Run with:
//!   cargo run --example museum_report -- data/
//!   cargo run --example museum_report -- --config report.json

use anyhow::{bail, Context};
use museum_eda::config::{museum_presets, ReportConfig};
use museum_eda::pipeline::Pipeline;
use museum_eda::summary::DistributionTable;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    museum_eda::telemetry::init()?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let configs = match args.as_slice() {
        [flag, path] if flag == "--config" => {
            ReportConfig::from_path(path)
                .with_context(|| format!("Failed to load config {path}"))?
                .collections
        }
        [dir] => museum_presets(&PathBuf::from(dir)),
        [] => museum_presets(&PathBuf::from("data")),
        _ => bail!("usage: museum_report [DATA_DIR | --config FILE]"),
    };

    #[cfg(feature = "rayon")]
    let report = Pipeline::new().run_parallel(&configs);
    #[cfg(not(feature = "rayon"))]
    let report = Pipeline::new().run(&configs);

    println!("=== Museum Collections ===\n");
    for collection in report.reports() {
        let summary = &collection.summary;
        println!("{}", summary.collection);
        println!("  rows:            {}", summary.total_count);
        println!("  distinct artists: {}", summary.distinct_count);
        match (summary.earliest, summary.latest) {
            (Some(earliest), Some(latest)) => println!("  date range:      {earliest} .. {latest}"),
            _ => println!("  date range:      undefined"),
        }

        for named in &collection.distributions {
            match &named.table {
                DistributionTable::Categorical(dist) => {
                    println!("  {} (top {}):", named.name, dist.len());
                    for entry in dist {
                        println!("    {:<40} {}", entry.label, entry.count);
                    }
                }
                DistributionTable::Binned(dist) => {
                    println!("  {}:", named.name);
                    for entry in dist {
                        println!("    {:<8} {}", entry.label, entry.count);
                    }
                }
                DistributionTable::Normalized(dist) => {
                    println!("  {}:", named.name);
                    for entry in dist.entries() {
                        println!("    {:<20} {:>6.2}%", entry.label, entry.fraction * 100.0);
                    }
                }
            }
        }
        for warning in &collection.warnings {
            println!("  warning: {warning}");
        }
        println!();
    }

    for (collection, error) in report.failures() {
        println!("{collection}: FAILED ({error})");
    }

    let out = PathBuf::from("museum_report.json");
    std::fs::write(&out, report.to_json()?)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    println!("\nReport written to {}", out.display());

    Ok(())
}
