//! Record extraction from a single card fragment
//!
//! Pulls the typed schema fields out of one listing card using ordered
//! fallback strategies per field. Field-level misses never abort record
//! extraction; a card is only a failure when no record ID can be found.

use crate::extract::parsers;
use crate::extract::strategy::{FieldSpec, Strategy};
use crate::model::{ExtractionOutcome, Listing, ListingStatus};
use crate::urls::resolve_href;
use crate::HarvestError;
use scraper::ElementRef;
use url::Url;

/// Source ID attributes carry this prefix on the card element
const ID_PREFIX: &str = "property_";

/// Fields that must all be present for an outcome to count as complete
const CORE_FIELDS: [&str; 6] = ["price", "beds", "baths", "sqft", "address", "status"];

/// Extracts typed records from listing card fragments
pub struct CardExtractor {
    id: FieldSpec,
    price: FieldSpec,
    status: FieldSpec,
    address: FieldSpec,
    locality: FieldSpec,
    beds: FieldSpec,
    baths: FieldSpec,
    sqft: FieldSpec,
    kind: FieldSpec,
    detail_link: FieldSpec,
}

impl CardExtractor {
    pub fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            id: FieldSpec::new(
                "id",
                vec![
                    Strategy::root_attr("id"),
                    Strategy::root_attr("data-property-id"),
                ],
            ),
            price: FieldSpec::new(
                "price",
                vec![
                    Strategy::text(".price")?,
                    Strategy::text(".listing-price")?,
                    Strategy::pattern(r"(\$[\d,]+)")?,
                ],
            ),
            status: FieldSpec::new(
                "status",
                vec![
                    Strategy::text(".status")?,
                    Strategy::root_attr("data-status"),
                ],
            ),
            address: FieldSpec::new(
                "address",
                vec![
                    Strategy::nth_text("h3.address", 0)?,
                    Strategy::nth_text(".address", 0)?,
                ],
            ),
            locality: FieldSpec::new(
                "locality",
                vec![
                    Strategy::nth_text("h3.address", 1)?,
                    Strategy::nth_text(".address", 1)?,
                ],
            ),
            beds: FieldSpec::new(
                "beds",
                vec![Strategy::nth_text("ul.info li", 1)?, Strategy::text(".beds")?],
            ),
            baths: FieldSpec::new(
                "baths",
                vec![
                    Strategy::nth_text("ul.info li", 2)?,
                    Strategy::text(".baths")?,
                ],
            ),
            sqft: FieldSpec::new(
                "sqft",
                vec![Strategy::nth_text("ul.info li", 3)?, Strategy::text(".sqft")?],
            ),
            kind: FieldSpec::new(
                "property_type",
                vec![
                    Strategy::nth_text("ul.info li", 0)?,
                    Strategy::text(".property-type")?,
                ],
            ),
            detail_link: FieldSpec::new(
                "detail_url",
                vec![
                    Strategy::attr("a.details-link", "href")?,
                    Strategy::attr("a[href]", "href")?,
                ],
            ),
        })
    }

    /// Extracts one card fragment into a typed outcome
    pub fn extract(&self, fragment: ElementRef<'_>, base_url: &Url) -> ExtractionOutcome {
        let Some(id) = self.record_id(fragment) else {
            return ExtractionOutcome::Failed {
                fragment: snippet(fragment),
                reason: "no record ID on fragment".to_string(),
            };
        };

        let mut listing = Listing::new(id);
        let mut missing: Vec<&'static str> = Vec::new();

        listing.price = self
            .price
            .first_match(fragment)
            .and_then(|raw| parsers::parse_price(&raw));
        listing.beds = self
            .beds
            .first_match(fragment)
            .and_then(|raw| parsers::parse_count(&raw));
        listing.baths = self
            .baths
            .first_match(fragment)
            .and_then(|raw| parsers::parse_decimal(&raw));
        listing.sqft = self
            .sqft
            .first_match(fragment)
            .and_then(|raw| parsers::parse_sqft(&raw));
        listing.status = self
            .status
            .first_match(fragment)
            .and_then(|raw| ListingStatus::parse(&raw));
        listing.address = self.address.first_match(fragment);

        if let Some(locality) = self.locality.first_match(fragment) {
            if let Some((city, state, zip)) = parsers::parse_city_state_zip(&locality) {
                listing.city = Some(city);
                listing.state = Some(state);
                listing.zip_code = Some(zip);
            } else {
                // Unparsable second address line is still worth keeping.
                listing.extras.insert("locality".to_string(), locality);
            }
        }

        if let Some(kind) = self.kind.first_match(fragment) {
            listing.extras.insert("property_type".to_string(), kind);
        }

        listing.detail_url = self
            .detail_link
            .first_match(fragment)
            .and_then(|href| resolve_href(base_url, &href));

        for field in CORE_FIELDS {
            if !has_core_field(&listing, field) {
                missing.push(field);
            }
        }

        if missing.is_empty() {
            ExtractionOutcome::Complete(listing)
        } else {
            ExtractionOutcome::Partial { listing, missing }
        }
    }

    fn record_id(&self, fragment: ElementRef<'_>) -> Option<String> {
        let raw = self.id.first_match(fragment)?;
        let id = raw.strip_prefix(ID_PREFIX).unwrap_or(&raw);
        if id.is_empty() {
            None
        } else {
            Some(id.to_string())
        }
    }
}

/// True when the listing carries the named core field
pub fn has_core_field(listing: &Listing, field: &str) -> bool {
    match field {
        "price" => listing.price.is_some(),
        "beds" => listing.beds.is_some(),
        "baths" => listing.baths.is_some(),
        "sqft" => listing.sqft.is_some(),
        "address" => listing.address.is_some(),
        "status" => listing.status.is_some(),
        _ => false,
    }
}

/// True when every core field is populated; used to classify records in the
/// final report independently of when they were extracted
pub fn is_core_complete(listing: &Listing) -> bool {
    CORE_FIELDS.iter().all(|f| has_core_field(listing, f))
}

/// Short prefix of the fragment's markup for drift diagnostics
fn snippet(fragment: ElementRef<'_>) -> String {
    let html = fragment.html();
    let mut end = html.len().min(200);
    while !html.is_char_boundary(end) {
        end -= 1;
    }
    html[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn extract(card_html: &str) -> ExtractionOutcome {
        let doc = Html::parse_fragment(card_html);
        let selector = Selector::parse("article, div").unwrap();
        let fragment = doc.select(&selector).next().unwrap();
        let base = Url::parse("https://catalog.example.com/search").unwrap();
        CardExtractor::new().unwrap().extract(fragment, &base)
    }

    const FULL_CARD: &str = r#"
        <article id="property_117500519">
            <span class="price">$92,900</span>
            <span class="status">Active</span>
            <h3 class="address">659 3rd Place</h3>
            <h3 class="address">Mason City, IA 50401</h3>
            <ul class="info">
                <li>Single Family</li>
                <li>3 Beds</li>
                <li>2 Baths</li>
                <li>1,901 sqft</li>
            </ul>
            <a href="/details/117500519/659-3rd-place">View</a>
        </article>
    "#;

    #[test]
    fn test_full_card_is_complete() {
        let outcome = extract(FULL_CARD);
        assert!(outcome.is_complete());

        let listing = outcome.listing().unwrap();
        assert_eq!(listing.id, "117500519");
        assert_eq!(listing.price, Some(92_900));
        assert_eq!(listing.beds, Some(3));
        assert_eq!(listing.baths, Some(2.0));
        assert_eq!(listing.sqft, Some(1901));
        assert_eq!(listing.status, Some(ListingStatus::Active));
        assert_eq!(listing.address.as_deref(), Some("659 3rd Place"));
        assert_eq!(listing.city.as_deref(), Some("Mason City"));
        assert_eq!(listing.state.as_deref(), Some("IA"));
        assert_eq!(listing.zip_code.as_deref(), Some("50401"));
        assert_eq!(
            listing.detail_url.as_deref(),
            Some("https://catalog.example.com/details/117500519/659-3rd-place")
        );
        assert_eq!(listing.extras["property_type"], "Single Family");
    }

    #[test]
    fn test_missing_price_is_partial() {
        let outcome = extract(
            r#"
            <article id="property_200">
                <span class="status">Pending</span>
                <h3 class="address">1 Elm St</h3>
                <ul class="info">
                    <li>Single Family</li>
                    <li>4 Beds</li>
                </ul>
            </article>
            "#,
        );

        let ExtractionOutcome::Partial { listing, missing } = outcome else {
            panic!("expected partial outcome");
        };
        assert_eq!(listing.id, "200");
        assert_eq!(listing.price, None);
        assert_eq!(listing.beds, Some(4));
        assert!(missing.contains(&"price"));
        assert!(missing.contains(&"baths"));
        assert!(missing.contains(&"sqft"));
        assert!(!missing.contains(&"beds"));
    }

    #[test]
    fn test_no_id_is_failed_with_diagnostic() {
        let outcome = extract(r#"<div><span class="price">$50,000</span></div>"#);
        let ExtractionOutcome::Failed { fragment, reason } = outcome else {
            panic!("expected failed outcome");
        };
        assert!(reason.contains("record ID"));
        assert!(fragment.contains("price"));
    }

    #[test]
    fn test_id_with_zero_other_fields_is_partial() {
        let outcome = extract(r#"<article id="property_300"></article>"#);
        let ExtractionOutcome::Partial { listing, missing } = outcome else {
            panic!("expected partial outcome");
        };
        assert_eq!(listing.id, "300");
        assert_eq!(missing.len(), CORE_FIELDS.len());
    }

    #[test]
    fn test_unparsable_price_text_is_missing_not_error() {
        let outcome = extract(
            r#"
            <article id="property_400">
                <span class="price">Call for pricing</span>
            </article>
            "#,
        );
        let listing = outcome.listing().unwrap();
        assert_eq!(listing.price, None);
    }

    #[test]
    fn test_price_pattern_fallback() {
        // No .price element, but the amount appears in the card text.
        let outcome = extract(
            r#"
            <article id="property_500">
                <p>Listed at $88,500 this week</p>
            </article>
            "#,
        );
        let listing = outcome.listing().unwrap();
        assert_eq!(listing.price, Some(88_500));
    }

    #[test]
    fn test_unparsable_locality_kept_in_extras() {
        let outcome = extract(
            r#"
            <article id="property_600">
                <h3 class="address">659 3rd Place</h3>
                <h3 class="address">near the river</h3>
            </article>
            "#,
        );
        let listing = outcome.listing().unwrap();
        assert_eq!(listing.city, None);
        assert_eq!(listing.extras["locality"], "near the river");
    }
}
