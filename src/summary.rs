//! Aggregate overview of the loaded catalog.
//!
//! Answers "what did we just load" at a glance: totals, category chips,
//! districts per province, and the natural-region split. Used by
//! `dcat summary` to give confidence that a source change or re-export
//! did not quietly drop half the country.

use anyhow::Result;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::resolver;

/// Run the summary command: resolve the chain and print the breakdowns.
pub async fn run_summary(config: &Config) -> Result<()> {
    let chain = resolver::build_chain(config);
    let resolution = resolver::resolve(&chain).await?;
    let provider = resolution.provider.clone();
    let rejected = resolution.rejected;
    let catalog = Catalog::new(resolution.records);

    println!("District Catalog — Summary");
    println!("==========================");
    println!();
    println!("  Provider:    {}", provider);
    println!("  Records:     {}", catalog.records().len());
    println!("  Rejected:    {}", rejected);
    if let Some((lat, lng)) = catalog.center() {
        println!("  Center:      {:.4}, {:.4}", lat, lng);
    }

    let total = catalog.records().len().max(1);

    let categories = catalog.category_counts();
    if !categories.is_empty() {
        println!();
        println!("  By category:");
        println!("  {:<32} {:>6} {:>7}", "CATEGORY", "COUNT", "SHARE");
        println!("  {}", "-".repeat(48));
        for (label, n) in &categories {
            println!(
                "  {:<32} {:>6} {:>6.1}%",
                label,
                n,
                (*n as f64 / total as f64) * 100.0
            );
        }
    }

    let provinces = catalog.provinces();
    if !provinces.is_empty() {
        println!();
        println!("  By province:");
        println!("  {:<32} {:>6} {:>8}", "PROVINCE", "COUNT", "CANTONS");
        println!("  {}", "-".repeat(49));
        for province in &provinces {
            let count = catalog
                .records()
                .iter()
                .filter(|r| r.province == *province)
                .count();
            println!(
                "  {:<32} {:>6} {:>8}",
                province,
                count,
                catalog.cantons_of(province).len()
            );
        }
    }

    let regions = catalog.region_breakdown();
    if !regions.is_empty() {
        println!();
        println!("  By natural region:");
        for (region, n) in &regions {
            println!(
                "  {:<12} {:>4} ({:.1}%)",
                region.to_string(),
                n,
                (*n as f64 / total as f64) * 100.0
            );
        }
    }

    println!();
    Ok(())
}
