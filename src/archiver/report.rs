//! Archive run reports
//!
//! This module describes the outcome of one archive run and prints it for the
//! command line.

use crate::crawler::AssetType;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// An asset that could not be archived
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of one archive run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveReport {
    /// Public URL of the archived entry page
    pub preview_url: String,

    /// Archive domain (seed host without `www.`)
    pub domain: String,

    /// Date partition the run was stored under
    pub date: NaiveDate,

    /// Number of assets discovery produced
    pub discovered: usize,

    /// Discovered assets per type
    pub assets_by_type: BTreeMap<AssetType, usize>,

    /// Storage keys written, sorted
    pub stored: Vec<String>,

    /// Cross-host iframes that were recorded but not fetched
    pub skipped_external: Vec<String>,

    /// Assets that failed to fetch, rewrite or store
    pub failures: Vec<AssetFailure>,
}

impl ArchiveReport {
    /// Returns true if every fetchable asset was stored
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Prints an archive report to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The report to display
pub fn print_report(report: &ArchiveReport) {
    println!("=== Archive Report ===\n");

    println!("Overview:");
    println!("  Domain: {}", report.domain);
    println!("  Date: {}", report.date.format("%Y-%m-%d"));
    println!("  Assets discovered: {}", report.discovered);
    println!("  Assets stored: {}", report.stored.len());
    println!("  External iframes skipped: {}", report.skipped_external.len());
    println!("  Failures: {}", report.failures.len());
    println!();

    println!("Assets by Type:");
    // Sort types by count (descending)
    let mut type_counts: Vec<_> = report.assets_by_type.iter().collect();
    type_counts.sort_by(|a, b| b.1.cmp(a.1));

    for (asset_type, count) in type_counts {
        let percentage = if report.discovered > 0 {
            (*count as f64 / report.discovered as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", asset_type, count, percentage);
    }
    println!();

    if !report.failures.is_empty() {
        println!("Failed Assets:");
        for failure in &report.failures {
            println!("  {} ({})", failure.url, failure.reason);
        }
        println!();
    }

    println!("Preview: {}", report.preview_url);
}
