//! Typed parsers for raw extracted text
//!
//! Each parser converts raw card text into a target type under deterministic
//! rules. A parser failing means the field is missing, never an error.

use regex::Regex;
use std::sync::OnceLock;

fn int_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("hardcoded regex"))
}

fn decimal_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+(?:\.\d+)?").expect("hardcoded regex"))
}

fn city_state_zip() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([^,]+),\s*([A-Z]{2})\s+(\d{5}(?:-\d{4})?)$").expect("hardcoded regex")
    })
}

/// Parses monetary text like "$92,900" into whole dollars.
///
/// Currency symbols, grouping separators, and whitespace are stripped;
/// anything else remaining fails the parse.
pub fn parse_price(text: &str) -> Option<i64> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();

    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parses count text like "3 Beds" via its leading numeric token
pub fn parse_count(text: &str) -> Option<u32> {
    int_token().find(text)?.as_str().parse().ok()
}

/// Parses decimal text like "2.5 Baths" via its leading numeric token
pub fn parse_decimal(text: &str) -> Option<f64> {
    decimal_token().find(text)?.as_str().parse().ok()
}

/// Parses size text like "1,901 sqft": grouping separators and the unit
/// suffix are stripped before the numeric parse.
pub fn parse_sqft(text: &str) -> Option<u32> {
    let cleaned = text.replace(',', "");
    int_token().find(&cleaned)?.as_str().parse().ok()
}

/// Splits an address line like "Mason City, IA 50401" into
/// (city, state, zip_code)
pub fn parse_city_state_zip(text: &str) -> Option<(String, String, String)> {
    let caps = city_state_zip().captures(text.trim())?;
    Some((
        caps[1].trim().to_string(),
        caps[2].to_string(),
        caps[3].to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price("$92,900"), Some(92_900));
        assert_eq!(parse_price("$1,234,567"), Some(1_234_567));
        assert_eq!(parse_price(" 250000 "), Some(250_000));
    }

    #[test]
    fn test_parse_price_non_numeric_fails() {
        assert_eq!(parse_price("Call for price"), None);
        assert_eq!(parse_price("$"), None);
        assert_eq!(parse_price(""), None);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("3 Beds"), Some(3));
        assert_eq!(parse_count("Beds: 4"), Some(4));
        assert_eq!(parse_count("Studio"), None);
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("2.5 Baths"), Some(2.5));
        assert_eq!(parse_decimal("2 Baths"), Some(2.0));
        assert_eq!(parse_decimal("no baths listed"), None);
    }

    #[test]
    fn test_parse_sqft() {
        assert_eq!(parse_sqft("1,901 sqft"), Some(1901));
        assert_eq!(parse_sqft("850 sq ft"), Some(850));
        assert_eq!(parse_sqft("unknown"), None);
    }

    #[test]
    fn test_parse_city_state_zip() {
        assert_eq!(
            parse_city_state_zip("Mason City, IA 50401"),
            Some(("Mason City".into(), "IA".into(), "50401".into()))
        );
        assert_eq!(
            parse_city_state_zip("Des Moines, IA 50309-1234"),
            Some(("Des Moines".into(), "IA".into(), "50309-1234".into()))
        );
    }

    #[test]
    fn test_parse_city_state_zip_malformed() {
        assert_eq!(parse_city_state_zip("just a street name"), None);
        assert_eq!(parse_city_state_zip("City, Iowa 50401"), None);
    }
}
