use anyhow::{Context, Result};

use toplists::config::Config;
use toplists::pipeline::split::MERGED_FILE;
use toplists::pipeline::{combine_all, merge_combined, split_dataset};

/// Combine per-job toplists per discipline, then merge them into one dataset
pub fn combine(config: &Config) -> Result<()> {
    let paths = &config.paths;

    let summary = combine_all(&paths.scrape_root, &paths.combined_dir).with_context(|| {
        format!(
            "Failed to combine toplists from {}",
            paths.scrape_root.display()
        )
    })?;

    println!("\nCombine Summary");
    println!("===============");
    println!("Groups written: {}", summary.groups_written);
    println!("Groups skipped: {}", summary.groups_skipped);
    println!("Rows: {}", summary.rows);
    println!("Output directory: {}", paths.combined_dir.display());

    let merged = paths.datasets_dir.join(MERGED_FILE);
    let rows = merge_combined(&paths.combined_dir, &merged)
        .with_context(|| format!("Failed to merge combined files into {}", merged.display()))?;

    println!("Merged dataset: {} ({rows} rows)", merged.display());

    Ok(())
}

/// Split the merged dataset into individual/relay and per-gender partitions
pub fn split(config: &Config) -> Result<()> {
    let datasets_dir = &config.paths.datasets_dir;
    let merged = datasets_dir.join(MERGED_FILE);

    let summary = split_dataset(&merged, datasets_dir)
        .with_context(|| format!("Failed to split {}", merged.display()))?;

    println!("\nSplit Summary");
    println!("=============");
    println!("Individual rows: {}", summary.individual);
    println!("Relay rows: {}", summary.relay);
    println!("Type partitions: {}", summary.type_files);
    println!("Discipline partitions: {}", summary.discipline_files);
    println!("Output directory: {}", datasets_dir.display());

    Ok(())
}
