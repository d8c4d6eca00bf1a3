//! Catalog walk state machine
//!
//! The controller drives the listing phase: fetch a page, parse it, fold
//! the extracted records into the checkpoint, commit, move to the next
//! page. Each page is committed before its successor is attempted, so the
//! checkpoint's `last_page` always names a page whose records are fully
//! durable and a resumed run starts at `last_page + 1`.

use crate::checkpoint::{Checkpoint, CheckpointStore};
use crate::config::Config;
use crate::crawler::fetcher::Fetch;
use crate::crawler::pacer::Pacer;
use crate::extract::PageParser;
use crate::urls::page_url;
use crate::{HarvestError, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use url::Url;

/// States of the catalog walk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Start,
    Fetching,
    Parsing,
    Extracting,
    Checkpointing,
    Retrying,
    Done,
    Failed,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Fetching => "FETCHING",
            Self::Parsing => "PARSING",
            Self::Extracting => "EXTRACTING",
            Self::Checkpointing => "CHECKPOINTING",
            Self::Retrying => "RETRYING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
        };
        write!(f, "{}", name)
    }
}

/// How the listing phase ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingOutcome {
    /// The catalog was walked to its end (or the configured page cap)
    Completed,
    /// A shutdown request stopped the walk; the checkpoint holds progress
    Interrupted,
}

pub struct Controller {
    fetcher: Arc<dyn Fetch>,
    parser: PageParser,
    pacer: Arc<Pacer>,
    start_url: Url,
    max_pages: u32,
    retry_limit: u32,
    retry_backoff: Duration,
    shutdown: watch::Receiver<bool>,
    state: CrawlState,
    /// Pages committed by this run (not counting pages replayed from a
    /// prior checkpoint)
    pub pages_processed: u32,
    /// Fragments that could not be identified as records this run
    pub records_failed: u64,
}

impl Controller {
    pub fn new(
        fetcher: Arc<dyn Fetch>,
        pacer: Arc<Pacer>,
        config: &Config,
        shutdown: watch::Receiver<bool>,
    ) -> Result<Self> {
        Ok(Self {
            fetcher,
            parser: PageParser::new()?,
            pacer,
            start_url: Url::parse(&config.catalog.start_url)?,
            max_pages: config.catalog.max_pages,
            retry_limit: config.crawler.retry_limit,
            retry_backoff: Duration::from_millis(config.crawler.retry_backoff_ms),
            shutdown,
            state: CrawlState::Start,
            pages_processed: 0,
            records_failed: 0,
        })
    }

    fn transition(&mut self, next: CrawlState) {
        tracing::trace!("state: {} -> {}", self.state, next);
        self.state = next;
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Walks catalog pages until the catalog ends, the page cap is hit, or
    /// shutdown is requested.
    ///
    /// Progress is committed page-by-page into `checkpoint` via `store`;
    /// on error the checkpoint still reflects every fully committed page.
    pub async fn run_listing_phase(
        &mut self,
        checkpoint: &mut Checkpoint,
        store: &CheckpointStore,
    ) -> Result<ListingOutcome> {
        let mut page = checkpoint.last_page + 1;
        if checkpoint.last_page > 0 {
            tracing::info!(
                "resuming from page {} ({} records already collected)",
                page,
                checkpoint.listings.len()
            );
        }
        // The markup's own next link is preferred over constructed URLs
        // once we have seen a page.
        let mut next_override: Option<String> = None;

        loop {
            if self.shutdown_requested() {
                tracing::info!("shutdown requested, stopping after page {}", page - 1);
                return Ok(ListingOutcome::Interrupted);
            }
            if self.max_pages > 0 && page > self.max_pages {
                tracing::info!("page cap {} reached", self.max_pages);
                break;
            }

            let url = match next_override.take() {
                Some(url) => url,
                None => page_url(&self.start_url, page).to_string(),
            };

            let html = self.fetch_with_retry(&url, page).await?;

            self.transition(CrawlState::Parsing);
            let base = Url::parse(&url)?;
            let parsed = self.parser.parse(&html, &base, page);

            self.transition(CrawlState::Extracting);
            let mut records = Vec::new();
            for outcome in parsed.outcomes {
                match outcome {
                    crate::model::ExtractionOutcome::Failed { fragment, reason } => {
                        self.records_failed += 1;
                        tracing::warn!(
                            "page {}: skipping fragment ({}): {}",
                            page,
                            reason,
                            fragment
                        );
                    }
                    other => {
                        if let Some(listing) = other.listing() {
                            records.push(listing);
                        }
                    }
                }
            }
            let empty_page = records.is_empty();
            tracing::info!(
                "page {}: {} records extracted (total {})",
                page,
                records.len(),
                checkpoint.listings.len() + records.len()
            );
            checkpoint.absorb_records(records);

            self.transition(CrawlState::Checkpointing);
            checkpoint.complete_page(page);
            store.save(checkpoint)?;
            self.pages_processed += 1;

            if empty_page && parsed.pagination.next_url.is_none() {
                tracing::info!("page {} carried no records, treating as catalog end", page);
                break;
            }
            if parsed.pagination.is_terminal() {
                break;
            }
            next_override = parsed.pagination.next_url;
            page += 1;
        }

        self.transition(CrawlState::Done);
        Ok(ListingOutcome::Completed)
    }

    /// Fetches one URL, retrying transient failures with linear backoff.
    ///
    /// `retry_limit` counts total attempts. Permanent failures and
    /// exhausted retries are both fatal to the run, never silently
    /// skipped; skipping a listing page would leave a hole in the catalog
    /// walk that a resume could not detect.
    async fn fetch_with_retry(&mut self, url: &str, page: u32) -> Result<String> {
        let mut attempt = 1;
        loop {
            self.pacer.wait().await;
            self.transition(CrawlState::Fetching);
            tracing::debug!("fetching page {} (attempt {}): {}", page, attempt, url);

            match self.fetcher.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_transient() && attempt < self.retry_limit => {
                    self.transition(CrawlState::Retrying);
                    let backoff = self.retry_backoff * attempt;
                    tracing::warn!(
                        "page {} attempt {} failed ({}), retrying in {:?}",
                        page,
                        attempt,
                        e,
                        backoff
                    );
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                Err(e) if e.is_transient() => {
                    self.transition(CrawlState::Failed);
                    return Err(HarvestError::RetriesExhausted {
                        page,
                        attempts: attempt,
                        last_error: e.to_string(),
                    });
                }
                Err(e) => {
                    self.transition(CrawlState::Failed);
                    return Err(HarvestError::Fetch {
                        url: url.to_string(),
                        source: e,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_display() {
        assert_eq!(CrawlState::Start.to_string(), "START");
        assert_eq!(CrawlState::Extracting.to_string(), "EXTRACTING");
        assert_eq!(CrawlState::Retrying.to_string(), "RETRYING");
        assert_eq!(CrawlState::Done.to_string(), "DONE");
    }
}
