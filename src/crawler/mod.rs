//! Crawl orchestration: the catalog walk, politeness, and enrichment
//!
//! `harvest` is the crate's main entry point. It wires the checkpoint
//! store, the page-walk controller, and the detail enricher together and
//! returns a [`RunReport`](crate::model::RunReport) describing what
//! happened. Interrupted runs return with `interrupted` set and a halted
//! catalog walk returns with `failure` set; neither exports, and in both
//! cases the counters cover everything committed and the checkpoint
//! already holds what a resume needs.

mod controller;
mod enricher;
mod fetcher;
mod pacer;

pub use controller::{Controller, CrawlState, ListingOutcome};
pub use enricher::{run_enrichment, EnrichmentSummary};
pub use fetcher::{build_http_client, Fetch, FetchError, HttpFetcher};
pub use pacer::Pacer;

use crate::checkpoint::{Checkpoint, CheckpointStore, Phase};
use crate::config::Config;
use crate::export::write_csv;
use crate::extract::card::is_core_complete;
use crate::model::RunReport;
use crate::Result;
use std::sync::Arc;
use tokio::sync::watch;

/// Runs a full harvest with the production HTTP transport.
///
/// # Arguments
///
/// * `config` - Validated run configuration
/// * `config_hash` - Hash of the raw config file, stored in checkpoints
/// * `fresh` - Discard any existing checkpoint before starting
/// * `shutdown` - Flips to `true` when the operator requests a stop
pub async fn harvest(
    config: &Config,
    config_hash: &str,
    fresh: bool,
    shutdown: watch::Receiver<bool>,
) -> Result<RunReport> {
    let client = build_http_client(&config.crawler.user_agent, config.crawler.timeout_ms)?;
    let fetcher: Arc<dyn Fetch> = Arc::new(HttpFetcher::new(client));
    harvest_with_fetcher(config, config_hash, fresh, shutdown, fetcher).await
}

/// `harvest` with an injected transport; the seam tests drive stubs through.
pub async fn harvest_with_fetcher(
    config: &Config,
    config_hash: &str,
    fresh: bool,
    shutdown: watch::Receiver<bool>,
    fetcher: Arc<dyn Fetch>,
) -> Result<RunReport> {
    let store = CheckpointStore::new(&config.output.checkpoint_path);
    if fresh {
        store.delete()?;
    }

    let mut checkpoint = match store.load()? {
        Some(existing) => {
            if existing.config_hash != config_hash {
                tracing::warn!(
                    "configuration changed since the checkpoint was written; \
                     resuming with existing progress anyway"
                );
            }
            existing
        }
        None => Checkpoint::new(config_hash.to_string()),
    };

    let mut report = RunReport::default();

    if checkpoint.phase == Phase::Listing {
        let pacer = Arc::new(Pacer::new(
            config.crawler.page_delay_ms,
            config.crawler.jitter_ms,
        ));
        let mut controller =
            Controller::new(Arc::clone(&fetcher), pacer, config, shutdown.clone())?;
        let result = controller.run_listing_phase(&mut checkpoint, &store).await;
        report.pages_processed = controller.pages_processed;
        report.records_failed = controller.records_failed;

        // A failed walk still reports everything committed before the
        // failure; the checkpoint already holds the last good page.
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("catalog walk halted: {}", e);
                report.failure = Some(e.to_string());
                classify_records(&checkpoint, &mut report);
                return Ok(report);
            }
        };

        if outcome == ListingOutcome::Interrupted {
            store.save(&mut checkpoint)?;
            report.interrupted = true;
            classify_records(&checkpoint, &mut report);
            return Ok(report);
        }
        checkpoint.begin_enrichment();
        store.save(&mut checkpoint)?;
    }

    if checkpoint.phase == Phase::Enriching {
        if config.crawler.skip_details {
            tracing::info!("detail enrichment disabled, exporting card data only");
        } else {
            let pacer = Arc::new(Pacer::new(
                config.crawler.detail_delay_ms,
                config.crawler.jitter_ms,
            ));
            let summary = run_enrichment(
                Arc::clone(&fetcher),
                pacer,
                config,
                &mut checkpoint,
                &store,
                shutdown.clone(),
            )
            .await?;
            report.details_enriched = summary.enriched;
            report.detail_failures = summary.failures;
            if summary.interrupted {
                report.interrupted = true;
                classify_records(&checkpoint, &mut report);
                return Ok(report);
            }
        }
        checkpoint.finalize();
        store.save(&mut checkpoint)?;
    }

    write_csv(&checkpoint.listings, &config.output.csv_path)?;
    tracing::info!(
        "exported {} records to {}",
        checkpoint.listings.len(),
        config.output.csv_path
    );

    classify_records(&checkpoint, &mut report);
    Ok(report)
}

/// Completeness is judged against the final merged record set, so a field
/// filled in by enrichment or by a later page counts.
fn classify_records(checkpoint: &Checkpoint, report: &mut RunReport) {
    report.records_complete = 0;
    report.records_partial = 0;
    for listing in checkpoint.listings.values() {
        if is_core_complete(listing) {
            report.records_complete += 1;
        } else {
            report.records_partial += 1;
        }
    }
}
