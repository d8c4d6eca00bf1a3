//! Listing record and merge semantics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Enumerated listing status as shown on the catalog card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListingStatus {
    Active,
    Pending,
    Contingent,
    Sold,
    ComingSoon,
}

impl ListingStatus {
    /// Parses a status label, case-insensitively.
    ///
    /// Unrecognized labels fail the typed parse; the field is then treated
    /// as missing rather than guessed at.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "active" | "for sale" => Some(Self::Active),
            "pending" => Some(Self::Pending),
            "contingent" => Some(Self::Contingent),
            "sold" => Some(Self::Sold),
            "coming soon" => Some(Self::ComingSoon),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Contingent => "contingent",
            Self::Sold => "sold",
            Self::ComingSoon => "coming_soon",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One catalog record.
///
/// The ID comes from the source's own identifier and is stable across runs;
/// every other field is individually nullable. Fields outside the fixed
/// schema accumulate in `extras`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Stable record ID from the source (e.g. "117500519")
    pub id: String,

    /// Absolute URL of the record's detail page
    pub detail_url: Option<String>,

    // Listing page fields
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    /// Price in whole dollars
    pub price: Option<i64>,
    pub beds: Option<u32>,
    pub baths: Option<f64>,
    pub sqft: Option<u32>,
    pub status: Option<ListingStatus>,

    // Detail page fields
    pub year_built: Option<u32>,
    pub lot_size: Option<String>,
    pub mls_number: Option<String>,
    pub listing_date: Option<String>,
    pub days_on_market: Option<u32>,
    pub description: Option<String>,

    /// Fields discovered during scraping that have no fixed column
    #[serde(default)]
    pub extras: BTreeMap<String, String>,

    pub scraped_at: DateTime<Utc>,
}

impl Listing {
    /// Creates an empty listing for the given record ID
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            detail_url: None,
            address: None,
            city: None,
            state: None,
            zip_code: None,
            price: None,
            beds: None,
            baths: None,
            sqft: None,
            status: None,
            year_built: None,
            lot_size: None,
            mls_number: None,
            listing_date: None,
            days_on_market: None,
            description: None,
            extras: BTreeMap::new(),
            scraped_at: Utc::now(),
        }
    }

    /// Absorbs a later occurrence of the same record.
    ///
    /// When a record ID is re-emitted on a later page, the newer occurrence's
    /// non-null fields take precedence; fields the newer occurrence is
    /// missing keep their previous value. Extras are unioned with newer
    /// values winning per key.
    pub fn absorb(&mut self, newer: Listing) {
        debug_assert_eq!(self.id, newer.id);

        fn take<T>(older: &mut Option<T>, newer: Option<T>) {
            if newer.is_some() {
                *older = newer;
            }
        }

        take(&mut self.detail_url, newer.detail_url);
        take(&mut self.address, newer.address);
        take(&mut self.city, newer.city);
        take(&mut self.state, newer.state);
        take(&mut self.zip_code, newer.zip_code);
        take(&mut self.price, newer.price);
        take(&mut self.beds, newer.beds);
        take(&mut self.baths, newer.baths);
        take(&mut self.sqft, newer.sqft);
        take(&mut self.status, newer.status);
        take(&mut self.year_built, newer.year_built);
        take(&mut self.lot_size, newer.lot_size);
        take(&mut self.mls_number, newer.mls_number);
        take(&mut self.listing_date, newer.listing_date);
        take(&mut self.days_on_market, newer.days_on_market);
        take(&mut self.description, newer.description);
        self.extras.extend(newer.extras);
        self.scraped_at = newer.scraped_at;
    }

    /// Merges fields extracted from the record's detail page.
    ///
    /// Detail fields only fill gaps: a field already populated from the
    /// listing page is never overwritten. Keys with no fixed column land in
    /// `extras` (also fill-only).
    pub fn merge_detail(&mut self, fields: DetailFields) {
        fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
            if slot.is_none() {
                *slot = value;
            }
        }

        fill(&mut self.address, fields.address);
        fill(&mut self.city, fields.city);
        fill(&mut self.state, fields.state);
        fill(&mut self.zip_code, fields.zip_code);
        fill(&mut self.price, fields.price);
        fill(&mut self.beds, fields.beds);
        fill(&mut self.baths, fields.baths);
        fill(&mut self.sqft, fields.sqft);
        fill(&mut self.status, fields.status);
        fill(&mut self.year_built, fields.year_built);
        fill(&mut self.lot_size, fields.lot_size);
        fill(&mut self.mls_number, fields.mls_number);
        fill(&mut self.listing_date, fields.listing_date);
        fill(&mut self.days_on_market, fields.days_on_market);
        fill(&mut self.description, fields.description);
        for (key, value) in fields.extras {
            self.extras.entry(key).or_insert(value);
        }
    }
}

/// Fields extracted from a detail page, prior to merging
#[derive(Debug, Clone, Default)]
pub struct DetailFields {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub price: Option<i64>,
    pub beds: Option<u32>,
    pub baths: Option<f64>,
    pub sqft: Option<u32>,
    pub status: Option<ListingStatus>,
    pub year_built: Option<u32>,
    pub lot_size: Option<String>,
    pub mls_number: Option<String>,
    pub listing_date: Option<String>,
    pub days_on_market: Option<u32>,
    pub description: Option<String>,
    pub extras: BTreeMap<String, String>,
}
