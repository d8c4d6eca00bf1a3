//! Data model for the harvester
//!
//! # Components
//!
//! - `Listing`: one catalog record with a stable ID and individually
//!   nullable typed fields
//! - `PageDescriptor`: pagination evidence extracted from a listing page
//! - `ExtractionOutcome`: complete, partial, or failed extraction per fragment
//! - `RunReport`: the counters every run reports regardless of outcome

mod listing;
mod outcome;
mod page;

pub use listing::{DetailFields, Listing, ListingStatus};
pub use outcome::{EnrichFailure, ExtractionOutcome, RunReport};
pub use page::PageDescriptor;
