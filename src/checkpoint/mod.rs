//! Durable run state for resumable extraction
//!
//! The checkpoint is a single JSON snapshot of everything a run needs to
//! pick up where it left off: the records gathered so far, the last fully
//! committed page, which records have been enriched with detail data, and
//! a hash of the configuration that produced it. Snapshots are written
//! with an atomic replace so a crash mid-write can never leave a
//! half-written file behind.

mod store;

pub use store::{CheckpointError, CheckpointStore};

use crate::model::Listing;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Which stage of the run the checkpoint captures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Walking catalog pages and extracting card records
    Listing,
    /// Catalog walk finished, filling in detail-page fields
    Enriching,
    /// Run finished and exported
    Complete,
}

/// One snapshot of run progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Monotonic save counter, for diagnosing stale snapshots
    pub sequence: u64,
    pub phase: Phase,
    /// Highest page index whose records are fully committed. A resumed
    /// run starts at `last_page + 1`.
    pub last_page: u32,
    /// Hash of the config that produced this snapshot. A mismatch on
    /// resume means the run parameters changed underneath the data.
    pub config_hash: String,
    /// Records keyed by source ID. Re-extracting a known ID merges into
    /// the existing record with newer non-null values taking precedence.
    pub listings: BTreeMap<String, Listing>,
    /// IDs whose detail pages have been fetched and merged
    pub enriched: BTreeSet<String>,
    pub updated_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(config_hash: String) -> Self {
        Self {
            sequence: 0,
            phase: Phase::Listing,
            last_page: 0,
            config_hash,
            listings: BTreeMap::new(),
            enriched: BTreeSet::new(),
            updated_at: Utc::now(),
        }
    }

    /// Folds freshly extracted records into the snapshot.
    ///
    /// Duplicate IDs across pages (or across a resume boundary) collapse
    /// to one record; the newer extraction wins field-by-field but never
    /// erases a value with a null.
    pub fn absorb_records(&mut self, records: Vec<Listing>) {
        for record in records {
            match self.listings.get_mut(&record.id) {
                Some(existing) => existing.absorb(record),
                None => {
                    self.listings.insert(record.id.clone(), record);
                }
            }
        }
    }

    /// Marks a catalog page fully committed
    pub fn complete_page(&mut self, page: u32) {
        self.last_page = self.last_page.max(page);
    }

    /// Moves the snapshot from the listing phase to enrichment
    pub fn begin_enrichment(&mut self) {
        self.phase = Phase::Enriching;
    }

    pub fn mark_enriched(&mut self, id: &str) {
        self.enriched.insert(id.to_string());
    }

    pub fn finalize(&mut self) {
        self.phase = Phase::Complete;
    }

    /// Records that still need a detail fetch: those with a detail URL
    /// that are not yet marked enriched. Failed enrichments are never
    /// marked, so they reappear here on the next run.
    pub fn pending_details(&self) -> Vec<(String, String)> {
        self.listings
            .values()
            .filter(|l| !self.enriched.contains(&l.id))
            .filter_map(|l| {
                l.detail_url
                    .as_ref()
                    .map(|url| (l.id.clone(), url.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(id: &str) -> Listing {
        Listing::new(id.to_string())
    }

    #[test]
    fn test_absorb_merges_duplicate_ids() {
        let mut cp = Checkpoint::new("h".to_string());
        let mut first = listing("10");
        first.price = Some(90_000);
        first.beds = Some(3);
        cp.absorb_records(vec![first]);

        let mut second = listing("10");
        second.price = Some(92_900);
        cp.absorb_records(vec![second]);

        assert_eq!(cp.listings.len(), 1);
        let merged = &cp.listings["10"];
        assert_eq!(merged.price, Some(92_900));
        assert_eq!(merged.beds, Some(3));
    }

    #[test]
    fn test_complete_page_never_regresses() {
        let mut cp = Checkpoint::new("h".to_string());
        cp.complete_page(4);
        cp.complete_page(2);
        assert_eq!(cp.last_page, 4);
    }

    #[test]
    fn test_pending_details_skips_enriched_and_linkless() {
        let mut cp = Checkpoint::new("h".to_string());
        let mut a = listing("1");
        a.detail_url = Some("https://x.example.com/1".to_string());
        let mut b = listing("2");
        b.detail_url = Some("https://x.example.com/2".to_string());
        let c = listing("3"); // no detail link
        cp.absorb_records(vec![a, b, c]);
        cp.mark_enriched("1");

        let pending = cp.pending_details();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].0, "2");
    }
}
