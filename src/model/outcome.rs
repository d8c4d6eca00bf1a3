//! Per-fragment extraction outcomes and run-level reporting

use crate::model::Listing;

/// Result of extracting one record fragment
#[derive(Debug, Clone)]
pub enum ExtractionOutcome {
    /// Every schema field the card carries was extracted
    Complete(Listing),

    /// Record identified, but one or more fields are missing.
    ///
    /// Partial records are retained; downstream consumers decide how to
    /// treat the nulls.
    Partial {
        listing: Listing,
        /// Names of the fields that could not be extracted
        missing: Vec<&'static str>,
    },

    /// Fragment located but no record could be identified.
    ///
    /// Carries a snippet of the fragment's raw markup so operators can
    /// inspect extraction drift.
    Failed { fragment: String, reason: String },
}

impl ExtractionOutcome {
    /// The extracted listing, if one was identified
    pub fn listing(self) -> Option<Listing> {
        match self {
            Self::Complete(listing) | Self::Partial { listing, .. } => Some(listing),
            Self::Failed { .. } => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete(_))
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, Self::Partial { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// One failed detail enrichment
#[derive(Debug, Clone)]
pub struct EnrichFailure {
    pub id: String,
    pub url: String,
    pub reason: String,
}

/// Counters reported at the end of every run, regardless of outcome
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub pages_processed: u32,
    pub records_complete: u64,
    pub records_partial: u64,
    pub records_failed: u64,
    pub details_enriched: u64,
    pub detail_failures: Vec<EnrichFailure>,
    /// True when the run was stopped by the operator before completion
    pub interrupted: bool,
    /// Why the catalog walk halted, when it did; the counters above still
    /// describe everything committed before the failure
    pub failure: Option<String>,
}

impl RunReport {
    pub fn details_failed(&self) -> u64 {
        self.detail_failures.len() as u64
    }

    /// Total records currently in the result set
    pub fn records_total(&self) -> u64 {
        self.records_complete + self.records_partial
    }

    /// True when the run halted on a hard failure
    pub fn failed(&self) -> bool {
        self.failure.is_some()
    }
}
