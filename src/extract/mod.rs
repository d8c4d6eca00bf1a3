//! HTML extraction: card fragments, listing pages, and detail pages
//!
//! Extraction is table-driven. Each schema field carries an ordered list of
//! strategies tried against the fragment until one yields a value; the
//! fallbacks keep extraction working across minor catalog markup changes
//! without code edits beyond the strategy tables.

pub mod card;
pub mod detail;
pub mod page;
pub mod parsers;
pub mod strategy;

pub use card::CardExtractor;
pub use detail::DetailParser;
pub use page::{PageParser, ParsedListingPage};
pub use strategy::{FieldSpec, Strategy};
