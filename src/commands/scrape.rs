use anyhow::{Context, Result};

use toplists::config::Config;
use toplists::crawler::jobs::{enumerate_jobs, DisciplineMapping};
use toplists::crawler::Coordinator;
use toplists::models::{BatchSummary, JobOutcome, JobStatus};

/// Scrape every toplist listed in the discipline mapping
///
/// Individual job failures are reported but never fail the command.
pub async fn scrape(config: &Config) -> Result<BatchSummary> {
    println!("Starting toplist scrape");
    println!("=======================");

    let mapping = DisciplineMapping::from_file(&config.paths.options_file)?;
    if mapping.is_empty() {
        tracing::warn!(
            path = %config.paths.options_file.display(),
            "Discipline mapping lists no toplists"
        );
    }

    let jobs = enumerate_jobs(&mapping, &config.paths.scrape_root);
    println!(
        "Jobs: {} ({} gender/age combinations), workers: {}",
        jobs.len(),
        mapping.entries().len(),
        config.scraper.workers
    );

    let coordinator = Coordinator::from_config(config).context("Failed to set up scraper")?;
    let (outcomes, summary) = coordinator.run(jobs).await;

    print_summary(&summary);
    print_failures(&outcomes);

    if summary.failed > 0 || summary.partial > 0 {
        println!(
            "Error log: {}",
            coordinator.store().error_log_path().display()
        );
    }

    Ok(summary)
}

fn print_summary(summary: &BatchSummary) {
    println!("\nScrape Summary");
    println!("==============");
    println!("Total jobs: {}", summary.total_jobs);
    println!("Succeeded: {}", summary.succeeded);
    println!("Partial: {}", summary.partial);
    println!("Empty: {}", summary.empty);
    println!("Skipped: {}", summary.skipped);
    println!(
        "Failed: {} ({:.1}%)",
        summary.failed,
        summary.failure_rate()
    );
    println!("Rows written: {}", summary.total_rows);
    println!("Elapsed: {:.1}s", summary.elapsed.as_secs_f64());
}

fn print_failures(outcomes: &[JobOutcome]) {
    let failed: Vec<&JobOutcome> = outcomes
        .iter()
        .filter(|o| matches!(o.status, JobStatus::Failed(_) | JobStatus::Partial { .. }))
        .collect();

    if failed.is_empty() {
        return;
    }

    println!("\nIncomplete jobs");
    println!("---------------");
    for outcome in failed {
        match &outcome.status {
            JobStatus::Partial { rows, error } => {
                println!("  {} ({rows} rows kept): {error}", outcome.job)
            }
            JobStatus::Failed(error) => println!("  {}: {error}", outcome.job),
            _ => {}
        }
    }
}
