//! CSV export with a fixed, schema-stable column set

use crate::model::Listing;
use crate::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Column order is part of the output contract: consumers key on it, so it
/// never varies with which fields happen to be populated.
const COLUMNS: [&str; 19] = [
    "id",
    "address",
    "city",
    "state",
    "zip_code",
    "price",
    "beds",
    "baths",
    "sqft",
    "status",
    "year_built",
    "lot_size",
    "mls_number",
    "listing_date",
    "days_on_market",
    "description",
    "detail_url",
    "scraped_at",
    "extras",
];

/// Writes all records to `path`, sorted by record ID.
///
/// Missing values render as empty cells, never as zero or any other
/// sentinel; a blank price cell means "not extracted", not "free house".
pub fn write_csv(listings: &BTreeMap<String, Listing>, path: &str) -> Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(COLUMNS)?;
    for listing in listings.values() {
        writer.write_record(row(listing)?)?;
    }
    writer.flush()?;
    Ok(())
}

fn row(listing: &Listing) -> Result<Vec<String>> {
    let extras = if listing.extras.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&listing.extras)?
    };

    Ok(vec![
        listing.id.clone(),
        opt_str(&listing.address),
        opt_str(&listing.city),
        opt_str(&listing.state),
        opt_str(&listing.zip_code),
        opt_display(&listing.price),
        opt_display(&listing.beds),
        listing
            .baths
            .map(|b| format!("{:.1}", b))
            .unwrap_or_default(),
        opt_display(&listing.sqft),
        listing
            .status
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
        opt_display(&listing.year_built),
        opt_str(&listing.lot_size),
        opt_str(&listing.mls_number),
        opt_str(&listing.listing_date),
        opt_display(&listing.days_on_market),
        opt_str(&listing.description),
        opt_str(&listing.detail_url),
        listing.scraped_at.to_rfc3339(),
        extras,
    ])
}

fn opt_str(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn opt_display<T: std::fmt::Display>(value: &Option<T>) -> String {
    value.as_ref().map(T::to_string).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ListingStatus;
    use tempfile::TempDir;

    fn listing(id: &str) -> Listing {
        Listing::new(id.to_string())
    }

    fn export(listings: &BTreeMap<String, Listing>) -> Vec<Vec<String>> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(listings, path.to_str().unwrap()).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&path)
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_header_matches_column_contract() {
        let rows = export(&BTreeMap::new());
        assert_eq!(rows[0], COLUMNS.to_vec());
    }

    #[test]
    fn test_missing_fields_render_empty_not_zero() {
        let mut listings = BTreeMap::new();
        listings.insert("5".to_string(), listing("5"));
        let rows = export(&listings);

        let price_col = COLUMNS.iter().position(|c| *c == "price").unwrap();
        let beds_col = COLUMNS.iter().position(|c| *c == "beds").unwrap();
        assert_eq!(rows[1][price_col], "");
        assert_eq!(rows[1][beds_col], "");
    }

    #[test]
    fn test_rows_sorted_by_id() {
        let mut listings = BTreeMap::new();
        for id in ["30", "10", "20"] {
            listings.insert(id.to_string(), listing(id));
        }
        let rows = export(&listings);
        let ids: Vec<_> = rows[1..].iter().map(|r| r[0].clone()).collect();
        assert_eq!(ids, vec!["10", "20", "30"]);
    }

    #[test]
    fn test_populated_row_values() {
        let mut record = listing("117500519");
        record.price = Some(92_900);
        record.beds = Some(3);
        record.baths = Some(2.0);
        record.sqft = Some(1_901);
        record.status = Some(ListingStatus::Active);
        record.address = Some("659 3rd Place".to_string());
        record.extras.insert("property_type".to_string(), "SF".to_string());

        let mut listings = BTreeMap::new();
        listings.insert(record.id.clone(), record);
        let rows = export(&listings);

        let col = |name: &str| COLUMNS.iter().position(|c| *c == name).unwrap();
        assert_eq!(rows[1][col("price")], "92900");
        assert_eq!(rows[1][col("baths")], "2.0");
        assert_eq!(rows[1][col("status")], "active");
        assert_eq!(rows[1][col("extras")], r#"{"property_type":"SF"}"#);
    }
}
