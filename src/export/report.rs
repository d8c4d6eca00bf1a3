//! Run report formatting

use crate::checkpoint::Checkpoint;
use crate::model::RunReport;

/// Prints the run report to stdout in a formatted manner
pub fn print_report(report: &RunReport) {
    println!("=== Harvest Report ===\n");

    println!("Catalog walk:");
    println!("  Pages processed this run: {}", report.pages_processed);
    println!("  Records collected: {}", report.records_total());
    println!("    Complete: {}", report.records_complete);
    println!("    Partial:  {}", report.records_partial);
    println!("    Failed fragments: {}", report.records_failed);
    println!();

    println!("Detail enrichment:");
    println!("  Enriched: {}", report.details_enriched);
    println!("  Failed:   {}", report.details_failed());
    if !report.detail_failures.is_empty() {
        for failure in &report.detail_failures {
            println!("    - record {} ({}): {}", failure.id, failure.url, failure.reason);
        }
    }
    println!();

    if let Some(reason) = &report.failure {
        println!("Run failed: {}", reason);
        println!("Committed progress is saved; re-run to retry from the last good page.");
    } else if report.interrupted {
        println!("Run interrupted; progress saved. Re-run to resume.");
    } else {
        println!("Run complete.");
    }
}

/// Prints a summary of an existing checkpoint without running anything
pub fn print_checkpoint_summary(checkpoint: &Checkpoint) {
    println!("=== Checkpoint Summary ===\n");
    println!("  Phase: {:?}", checkpoint.phase);
    println!("  Last committed page: {}", checkpoint.last_page);
    println!("  Records collected: {}", checkpoint.listings.len());
    println!("  Records enriched: {}", checkpoint.enriched.len());
    println!("  Saves: {}", checkpoint.sequence);
    println!("  Last updated: {}", checkpoint.updated_at.to_rfc3339());
}
