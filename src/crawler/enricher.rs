//! Parallel detail-page enrichment
//!
//! After the catalog walk, records with a detail link get a second fetch
//! to fill in fields the cards omit. Fetches fan out across a bounded
//! worker pool; all checkpoint mutation happens in a single writer loop
//! on this task, so workers never contend over run state. A worker sends
//! one message per record and the writer commits every
//! `checkpoint-interval` merges.
//!
//! A detail failure is not fatal: the record keeps its card-level fields,
//! the failure is reported, and because the record is never marked
//! enriched the next run tries it again.

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::Config;
use crate::crawler::fetcher::Fetch;
use crate::crawler::pacer::Pacer;
use crate::extract::DetailParser;
use crate::model::{DetailFields, EnrichFailure};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch, Semaphore};
use tokio::task::JoinSet;

#[derive(Debug, Default)]
pub struct EnrichmentSummary {
    pub enriched: u64,
    pub failures: Vec<EnrichFailure>,
    /// True when shutdown stopped the pool before all pending records
    /// were attempted
    pub interrupted: bool,
}

enum DetailMessage {
    Enriched { id: String, fields: Box<DetailFields> },
    Failed(EnrichFailure),
    Skipped,
}

/// Fetches and merges detail pages for every pending record.
pub async fn run_enrichment(
    fetcher: Arc<dyn Fetch>,
    pacer: Arc<Pacer>,
    config: &Config,
    checkpoint: &mut Checkpoint,
    store: &CheckpointStore,
    shutdown: watch::Receiver<bool>,
) -> Result<EnrichmentSummary> {
    let pending = checkpoint.pending_details();
    if pending.is_empty() {
        return Ok(EnrichmentSummary::default());
    }
    tracing::info!(
        "enriching {} records with up to {} concurrent fetches",
        pending.len(),
        config.crawler.max_concurrent_details
    );

    let semaphore = Arc::new(Semaphore::new(config.crawler.max_concurrent_details as usize));
    let (tx, mut rx) = mpsc::channel::<DetailMessage>(pending.len().max(1));
    let retry_limit = config.crawler.retry_limit;
    let backoff = Duration::from_millis(config.crawler.retry_backoff_ms);

    let mut workers = JoinSet::new();
    for (id, url) in pending {
        let fetcher = Arc::clone(&fetcher);
        let pacer = Arc::clone(&pacer);
        let semaphore = Arc::clone(&semaphore);
        let tx = tx.clone();
        let shutdown = shutdown.clone();

        workers.spawn(async move {
            // Closing the semaphore is the pool-wide stop signal.
            let Ok(_permit) = semaphore.acquire().await else {
                let _ = tx.send(DetailMessage::Skipped).await;
                return;
            };
            if *shutdown.borrow() {
                semaphore.close();
                let _ = tx.send(DetailMessage::Skipped).await;
                return;
            }

            let message = match fetch_detail(&*fetcher, &pacer, &url, retry_limit, backoff).await
            {
                Ok(html) => parse_detail(&id, &url, &html),
                Err(reason) => DetailMessage::Failed(EnrichFailure { id, url, reason }),
            };
            let _ = tx.send(message).await;
        });
    }
    drop(tx);

    let mut summary = EnrichmentSummary::default();
    let mut merges_since_save = 0u32;
    while let Some(message) = rx.recv().await {
        match message {
            DetailMessage::Enriched { id, fields } => {
                if let Some(listing) = checkpoint.listings.get_mut(&id) {
                    listing.merge_detail(*fields);
                }
                checkpoint.mark_enriched(&id);
                summary.enriched += 1;
                merges_since_save += 1;
                if merges_since_save >= config.crawler.checkpoint_interval {
                    store.save(checkpoint)?;
                    merges_since_save = 0;
                }
            }
            DetailMessage::Failed(failure) => {
                tracing::warn!(
                    "detail fetch failed for record {} ({}): {}",
                    failure.id,
                    failure.url,
                    failure.reason
                );
                summary.failures.push(failure);
            }
            DetailMessage::Skipped => {
                summary.interrupted = true;
            }
        }
    }

    while let Some(joined) = workers.join_next().await {
        joined?;
    }
    store.save(checkpoint)?;

    if summary.interrupted {
        tracing::info!(
            "enrichment interrupted: {} enriched, remainder deferred to next run",
            summary.enriched
        );
    } else {
        tracing::info!(
            "enrichment finished: {} enriched, {} failed",
            summary.enriched,
            summary.failures.len()
        );
    }
    Ok(summary)
}

fn parse_detail(id: &str, url: &str, html: &str) -> DetailMessage {
    match DetailParser::new() {
        Ok(parser) => DetailMessage::Enriched {
            id: id.to_string(),
            fields: Box::new(parser.parse(html)),
        },
        Err(e) => DetailMessage::Failed(EnrichFailure {
            id: id.to_string(),
            url: url.to_string(),
            reason: e.to_string(),
        }),
    }
}

/// Detail fetch with the same transient-retry policy as the catalog walk,
/// except exhaustion surfaces as a per-record failure instead of ending
/// the run.
async fn fetch_detail(
    fetcher: &dyn Fetch,
    pacer: &Pacer,
    url: &str,
    retry_limit: u32,
    backoff: Duration,
) -> std::result::Result<String, String> {
    let mut attempt = 1;
    loop {
        pacer.wait().await;
        match fetcher.fetch(url).await {
            Ok(html) => return Ok(html),
            Err(e) if e.is_transient() && attempt < retry_limit => {
                tokio::time::sleep(backoff * attempt).await;
                attempt += 1;
            }
            Err(e) => return Err(e.to_string()),
        }
    }
}
