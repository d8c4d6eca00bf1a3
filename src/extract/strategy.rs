//! Ordered fallback extraction strategies
//!
//! A field is described by a prioritized list of strategies, each a pure
//! function from a fragment to an optional raw string. The extractor tries
//! them in order and commits to the first non-empty result. This is a
//! tagged-variant strategy table: adding a new way to locate a field means
//! adding a variant, not a type.

use crate::HarvestError;
use regex::Regex;
use scraper::{ElementRef, Selector};

/// One way of pulling a raw string out of a record fragment
#[derive(Debug, Clone)]
pub enum Strategy {
    /// An attribute of the fragment root, or of the first descendant
    /// matching `selector` when one is given
    Attr {
        selector: Option<Selector>,
        name: String,
    },

    /// Trimmed text of the first descendant matching the selector
    Text { selector: Selector },

    /// Trimmed text of the Nth (0-based) descendant matching the selector
    NthText { selector: Selector, index: usize },

    /// First capture group of a regex applied to the fragment's full text
    Pattern { regex: Regex },
}

impl Strategy {
    /// Attribute of the fragment root element
    pub fn root_attr(name: &str) -> Self {
        Self::Attr {
            selector: None,
            name: name.to_string(),
        }
    }

    /// Attribute of the first descendant matching `selector`
    pub fn attr(selector: &str, name: &str) -> Result<Self, HarvestError> {
        Ok(Self::Attr {
            selector: Some(parse_selector(selector)?),
            name: name.to_string(),
        })
    }

    /// Text of the first descendant matching `selector`
    pub fn text(selector: &str) -> Result<Self, HarvestError> {
        Ok(Self::Text {
            selector: parse_selector(selector)?,
        })
    }

    /// Text of the Nth descendant matching `selector`
    pub fn nth_text(selector: &str, index: usize) -> Result<Self, HarvestError> {
        Ok(Self::NthText {
            selector: parse_selector(selector)?,
            index,
        })
    }

    /// First capture group of `pattern` over the fragment text
    pub fn pattern(pattern: &str) -> Result<Self, HarvestError> {
        let regex = Regex::new(pattern)
            .map_err(|e| HarvestError::Selector(format!("bad pattern '{}': {}", pattern, e)))?;
        Ok(Self::Pattern { regex })
    }

    /// Applies the strategy to a fragment, yielding a non-empty trimmed
    /// string or nothing
    pub fn apply(&self, fragment: ElementRef<'_>) -> Option<String> {
        let raw = match self {
            Self::Attr {
                selector: None,
                name,
            } => fragment.value().attr(name).map(str::to_string),

            Self::Attr {
                selector: Some(selector),
                name,
            } => fragment
                .select(selector)
                .next()
                .and_then(|el| el.value().attr(name))
                .map(str::to_string),

            Self::Text { selector } => fragment
                .select(selector)
                .next()
                .map(|el| el.text().collect::<String>()),

            Self::NthText { selector, index } => fragment
                .select(selector)
                .nth(*index)
                .map(|el| el.text().collect::<String>()),

            Self::Pattern { regex } => {
                let text: String = fragment.text().collect();
                regex
                    .captures(&text)
                    .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
                    .map(|m| m.as_str().to_string())
            }
        };

        let trimmed = raw?.trim().to_string();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

/// An ordered list of strategies for one schema field
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub strategies: Vec<Strategy>,
}

impl FieldSpec {
    pub fn new(name: &'static str, strategies: Vec<Strategy>) -> Self {
        Self { name, strategies }
    }

    /// Tries each strategy in order, committing to the first non-empty raw
    /// result
    pub fn first_match(&self, fragment: ElementRef<'_>) -> Option<String> {
        self.strategies.iter().find_map(|s| s.apply(fragment))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, HarvestError> {
    Selector::parse(selector)
        .map_err(|e| HarvestError::Selector(format!("bad selector '{}': {:?}", selector, e)))
}
