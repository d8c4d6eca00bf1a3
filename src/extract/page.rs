//! Listing page parsing: fragment location and pagination discovery

use crate::extract::card::CardExtractor;
use crate::model::{ExtractionOutcome, PageDescriptor};
use crate::urls::resolve_href;
use crate::HarvestError;
use scraper::{Html, Selector};
use url::Url;

/// Everything extracted from one listing page
#[derive(Debug)]
pub struct ParsedListingPage {
    pub outcomes: Vec<ExtractionOutcome>,
    pub pagination: PageDescriptor,
}

/// Parses listing pages into record outcomes and pagination evidence
pub struct PageParser {
    /// Ordered container selectors; the first that matches any fragments
    /// wins. The looser fallbacks tolerate catalog markup drift.
    containers: Vec<Selector>,
    pagination_links: Vec<Selector>,
    pagination_container: Selector,
    card: CardExtractor,
}

impl PageParser {
    pub fn new() -> Result<Self, HarvestError> {
        Ok(Self {
            containers: vec![
                parse_selector(r#"article[id^="property_"]"#)?,
                parse_selector("article")?,
            ],
            pagination_links: vec![
                parse_selector(".pagination a")?,
                parse_selector("nav.pager a")?,
            ],
            pagination_container: parse_selector(".pagination, nav.pager")?,
            card: CardExtractor::new()?,
        })
    }

    /// Parses a listing page.
    ///
    /// A page yielding zero fragments is not an error; paired with absent
    /// pagination evidence it simply marks the end of the catalog.
    pub fn parse(&self, html: &str, base_url: &Url, page_index: u32) -> ParsedListingPage {
        let document = Html::parse_document(html);

        let mut outcomes = Vec::new();
        for selector in &self.containers {
            let fragments: Vec<_> = document.select(selector).collect();
            if fragments.is_empty() {
                continue;
            }
            tracing::debug!(
                "page {}: {} fragments via container selector {:?}",
                page_index,
                fragments.len(),
                selector
            );
            for fragment in fragments {
                outcomes.push(self.card.extract(fragment, base_url));
            }
            break;
        }

        let pagination = self.discover_pagination(&document, base_url, page_index);

        ParsedListingPage {
            outcomes,
            pagination,
        }
    }

    /// Scans the pagination control for numeric page links.
    ///
    /// The highest number seen becomes the known total; the link labeled
    /// `page_index + 1` becomes the next-page URL. A control that exists but
    /// yields no numbers is ambiguous and treated as terminal.
    fn discover_pagination(
        &self,
        document: &Html,
        base_url: &Url,
        page_index: u32,
    ) -> PageDescriptor {
        let mut total: Option<u32> = None;
        let mut next_url: Option<String> = None;

        for selector in &self.pagination_links {
            let mut saw_any = false;
            for anchor in document.select(selector) {
                saw_any = true;
                let label: String = anchor.text().collect::<String>().trim().to_string();
                let Ok(number) = label.parse::<u32>() else {
                    continue;
                };
                total = Some(total.map_or(number, |t: u32| t.max(number)));
                if number == page_index + 1 {
                    next_url = anchor
                        .value()
                        .attr("href")
                        .and_then(|href| resolve_href(base_url, href));
                }
            }
            if saw_any {
                break;
            }
        }

        if total.is_none() {
            if document.select(&self.pagination_container).next().is_some() {
                tracing::warn!(
                    "page {}: pagination control present but no page numbers found, \
                     treating as terminal",
                    page_index
                );
            } else {
                tracing::debug!("page {}: no pagination control, sole page", page_index);
            }
            return PageDescriptor::sole(page_index);
        }

        PageDescriptor {
            index: page_index,
            total_pages: total,
            next_url,
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| HarvestError::Selector(format!("bad selector '{}': {:?}", selector, e)))
}
