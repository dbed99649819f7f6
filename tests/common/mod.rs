//! Common test utilities

use std::path::Path;
use std::time::Duration;

use toplists::crawler::fetcher::ToplistFetcher;
use toplists::models::ResultRow;
use toplists::utils::retry::RetryPolicy;

/// Fetcher against a mock server with millisecond backoff
#[allow(dead_code)]
pub fn test_fetcher(base_url: &str, max_attempts: u32) -> ToplistFetcher {
    ToplistFetcher::with_config(
        base_url,
        RetryPolicy::new(max_attempts, 1),
        Duration::from_secs(5),
        0,
        false,
    )
    .unwrap()
    .with_last_day("2024-12-15")
}

/// One toplist table row with all eleven cells
#[allow(dead_code)]
pub fn table_row(rank: u32, mark: &str, competitor: &str) -> String {
    format!(
        "<tr><td>{rank}</td><td>{mark}</td><td></td><td>{competitor}</td>\
         <td>01 JAN 1995</td><td>KEN</td><td>1</td><td></td>\
         <td>Stade Louis II, Monaco (MON)</td><td>14 JUL 2023</td><td>1250</td></tr>"
    )
}

/// Results page wrapping the given rows
#[allow(dead_code)]
pub fn results_page(rows: &[String]) -> String {
    format!(
        "<html><body><table class=\"records-table\"><thead><tr><th>Rank</th></tr></thead>\
         <tbody>{}</tbody></table></body></html>",
        rows.concat()
    )
}

/// Write a per-job CSV as the scraper would
#[allow(dead_code)]
pub fn write_job_csv(path: &Path, rows: &[ResultRow]) {
    toplists::storage::csv_file::write_records(path, rows).unwrap();
}

/// Result row with the fields the pipeline reads
#[allow(dead_code)]
pub fn result_row(mark: &str, discipline: &str, event_type: &str, gender: &str) -> ResultRow {
    ResultRow {
        rank: "1".to_string(),
        mark: mark.to_string(),
        competitor: format!("Athlete {mark}"),
        dob: "01 Jan 2000".to_string(),
        nationality: "ETH".to_string(),
        venue: "Hayward Field, Eugene, OR (USA)".to_string(),
        event_date: "01 Jan 2020".to_string(),
        discipline: discipline.to_string(),
        event_type: event_type.to_string(),
        gender: gender.to_string(),
        age_category: "senior".to_string(),
        ..Default::default()
    }
}
