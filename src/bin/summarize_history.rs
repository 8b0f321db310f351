//! Utility to print the per-objective defaults derived from a campaign
//! history file, in the shape `CATALOG_PATH` expects.

use campaign_budget_api::history;
use std::path::PathBuf;

/// Main entry point for the history summary utility.
///
/// Reads `HISTORY_PATH` (or the first argument), prints overall and
/// per-objective delivery metrics, then the derived catalog as JSON.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("HISTORY_PATH").ok())
        .map(PathBuf::from)
        .ok_or_else(|| anyhow::anyhow!("usage: summarize_history <history.json>"))?;

    let records = history::load_records(&path)?;
    let summary = history::aggregate(&records);

    println!("Analysis of {} rows:", records.len());
    println!("  total_spend: {:.2}", summary.overall.spend);
    println!("  total_impressions: {}", summary.overall.impressions);
    println!("  total_clicks: {}", summary.overall.clicks);
    println!("  overall_cpm: {:.2}", summary.overall.cpm());
    println!("  overall_cpc: {:.2}", summary.overall.cpc());
    println!("  overall_ctr: {:.2}", summary.overall.ctr());

    println!("\nMetrics by objective:");
    for entry in &summary.by_objective {
        println!("\n{}:", entry.objective);
        println!("  spend: {:.2}", entry.totals.spend);
        println!("  cpm: {:.2}", entry.totals.cpm());
        println!("  cpc: {:.2}", entry.totals.cpc());
        println!("  ctr: {:.2}", entry.totals.ctr());
        println!("  conversion_rate: {:.2}", entry.totals.conversion_rate());
        println!("  cost_per_result: {:.2}", entry.totals.cost_per_result());
    }

    let catalog = summary.to_catalog()?;
    println!("\n{}", serde_json::to_string_pretty(catalog.list_all())?);

    Ok(())
}
