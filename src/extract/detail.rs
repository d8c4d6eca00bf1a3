//! Detail page parsing for record enrichment
//!
//! Detail pages carry fields the listing cards omit, laid out as labeled
//! pairs (`<dt>`/`<dd>` tables or `Label: Value` list items). Labels vary
//! in casing and punctuation across the catalog, so matching is normalized
//! and anything unrecognized is preserved under a slugified extras key
//! rather than dropped.

use crate::extract::parsers::{parse_count, parse_price};
use crate::model::{DetailFields, ListingStatus};
use crate::HarvestError;
use scraper::{Html, Selector};

pub struct DetailParser {
    terms: Selector,
    pair_items: Selector,
    description: Vec<Selector>,
}

impl DetailParser {
    pub fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            terms: parse_selector("dl dt")?,
            pair_items: parse_selector(".details li, .property-details li, ul.facts li")?,
            description: vec![
                parse_selector(".description")?,
                parse_selector(".remarks")?,
                parse_selector("#description")?,
            ],
        })
    }

    pub fn parse(&self, html: &str) -> DetailFields {
        let document = Html::parse_document(html);
        let mut fields = DetailFields::default();

        for dt in document.select(&self.terms) {
            let label: String = dt.text().collect();
            // The paired <dd> is the next element sibling.
            let value = dt
                .next_siblings()
                .filter_map(scraper::ElementRef::wrap)
                .find(|el| el.value().name() == "dd")
                .map(|dd| dd.text().collect::<String>());
            if let Some(value) = value {
                assign(&mut fields, &label, value.trim());
            }
        }

        for item in document.select(&self.pair_items) {
            let text: String = item.text().collect();
            if let Some((label, value)) = text.split_once(':') {
                assign(&mut fields, label, value.trim());
            }
        }

        for selector in &self.description {
            if let Some(el) = document.select(selector).next() {
                let text = normalize_whitespace(&el.text().collect::<String>());
                if !text.is_empty() {
                    fields.description = Some(text);
                    break;
                }
            }
        }

        fields
    }
}

/// Routes one labeled value into its typed field, or into extras when the
/// label is unrecognized. Values that fail typed parsing are dropped so a
/// malformed detail page never clobbers card data with garbage.
fn assign(fields: &mut DetailFields, label: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    let key = slugify(label);
    match key.as_str() {
        "price" | "list_price" => fields.price = parse_price(value),
        "beds" | "bedrooms" => fields.beds = parse_count(value),
        "baths" | "bathrooms" => {
            fields.baths = crate::extract::parsers::parse_decimal(value)
        }
        "sqft" | "square_feet" | "square_footage" => {
            fields.sqft = crate::extract::parsers::parse_sqft(value)
        }
        "status" => fields.status = ListingStatus::parse(value),
        "year_built" => fields.year_built = parse_count(value),
        "lot_size" | "lot" | "acres" => fields.lot_size = Some(value.to_string()),
        "mls" | "mls_number" | "mls_id" => fields.mls_number = Some(value.to_string()),
        "listing_date" | "listed" | "date_listed" => {
            fields.listing_date = Some(value.to_string())
        }
        "days_on_market" | "dom" => fields.days_on_market = parse_count(value),
        _ => {
            fields.extras.insert(key, value.to_string());
        }
    }
}

/// Lowercases a label and collapses runs of non-alphanumerics to single
/// underscores: "Year Built:" -> "year_built", "MLS #" -> "mls".
fn slugify(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('_') && !out.is_empty() {
            out.push('_');
        }
    }
    out.trim_end_matches('_').to_string()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| HarvestError::Selector(format!("bad selector '{}': {:?}", selector, e)))
}
