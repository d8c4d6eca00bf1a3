//! URL construction and link resolution for the catalog

use url::Url;

/// Schemes that never point at a fetchable detail page
const SKIPPED_SCHEMES: &[&str] = &["javascript", "mailto", "tel", "data"];

/// Builds the URL for a given catalog page.
///
/// Page 1 is the start URL as configured. Later pages carry a `page` query
/// parameter; any existing `page` parameter on the start URL is replaced
/// rather than duplicated.
///
/// # Arguments
///
/// * `base` - The configured catalog start URL
/// * `page` - 1-based page index
pub fn page_url(base: &Url, page: u32) -> Url {
    if page <= 1 {
        return base.clone();
    }

    let mut url = base.clone();
    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (k, v) in &retained {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url
}

/// Resolves an href from page markup against the page's base URL.
///
/// Relative links are joined against the base. Non-navigational hrefs
/// (javascript:, mailto:, tel:, data:, bare fragments, empty strings) and
/// anything that resolves to a non-HTTP scheme are rejected.
///
/// # Returns
///
/// * `Some(String)` - Absolute HTTP(S) URL
/// * `None` - The href is not a fetchable link
pub fn resolve_href(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    if let Some((scheme, _)) = href.split_once(':') {
        if SKIPPED_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) {
            return None;
        }
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://catalog.example.com/search?city=mason-city").unwrap()
    }

    #[test]
    fn test_page_one_is_start_url() {
        assert_eq!(page_url(&base(), 1), base());
    }

    #[test]
    fn test_later_pages_append_page_param() {
        let url = page_url(&base(), 3);
        assert_eq!(
            url.as_str(),
            "https://catalog.example.com/search?city=mason-city&page=3"
        );
    }

    #[test]
    fn test_existing_page_param_replaced() {
        let start = Url::parse("https://catalog.example.com/search?page=9&sort=price").unwrap();
        let url = page_url(&start, 2);
        assert_eq!(
            url.as_str(),
            "https://catalog.example.com/search?sort=price&page=2"
        );
    }

    #[test]
    fn test_resolve_relative_href() {
        assert_eq!(
            resolve_href(&base(), "/listing/117500519").as_deref(),
            Some("https://catalog.example.com/listing/117500519")
        );
    }

    #[test]
    fn test_resolve_absolute_href() {
        assert_eq!(
            resolve_href(&base(), "https://other.example.com/x").as_deref(),
            Some("https://other.example.com/x")
        );
    }

    #[test]
    fn test_rejects_non_navigational_hrefs() {
        for href in ["javascript:void(0)", "mailto:agent@example.com", "tel:+15550100", "#top", "  "] {
            assert_eq!(resolve_href(&base(), href), None, "should reject {:?}", href);
        }
    }

    #[test]
    fn test_rejects_non_http_resolution() {
        assert_eq!(resolve_href(&base(), "ftp://example.com/file"), None);
    }
}
