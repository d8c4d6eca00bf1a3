//! Pagination descriptor

/// Pagination evidence extracted from one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageDescriptor {
    /// 1-based index of the page this descriptor was extracted from
    pub index: u32,

    /// Highest page number visible in the pagination control, if any
    pub total_pages: Option<u32>,

    /// Resolved URL of the next page's control, if present
    pub next_url: Option<String>,
}

impl PageDescriptor {
    /// Descriptor for a page with no pagination evidence at all
    pub fn sole(index: u32) -> Self {
        Self {
            index,
            total_pages: None,
            next_url: None,
        }
    }

    /// True when the catalog offers no page beyond this one.
    ///
    /// A page with no pagination control is treated as sole/terminal, and a
    /// page whose highest visible control is itself is terminal even if no
    /// explicit next link was found.
    pub fn is_terminal(&self) -> bool {
        if self.next_url.is_some() {
            return false;
        }
        match self.total_pages {
            Some(total) => self.index >= total,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sole_page_is_terminal() {
        assert!(PageDescriptor::sole(1).is_terminal());
    }

    #[test]
    fn test_next_url_means_not_terminal() {
        let desc = PageDescriptor {
            index: 2,
            total_pages: Some(5),
            next_url: Some("https://example.com/search?page=3".into()),
        };
        assert!(!desc.is_terminal());
    }

    #[test]
    fn test_last_known_page_is_terminal() {
        let desc = PageDescriptor {
            index: 5,
            total_pages: Some(5),
            next_url: None,
        };
        assert!(desc.is_terminal());
    }

    #[test]
    fn test_known_total_beyond_index_without_next_link() {
        // Pagination says more pages exist but no next link was resolvable;
        // the controller builds the next URL itself in that case.
        let desc = PageDescriptor {
            index: 2,
            total_pages: Some(5),
            next_url: None,
        };
        assert!(!desc.is_terminal());
    }
}
