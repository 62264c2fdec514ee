use regex::Regex;

/// Recognizes the per-technology "latest benchmarks" endpoint among the
/// responses a page issues
#[derive(Debug, Clone)]
pub struct LatestBenchmarksFilter {
    pattern: Regex,
}

impl Default for LatestBenchmarksFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl LatestBenchmarksFilter {
    pub fn new() -> Self {
        // The id must be a whole path segment: `7` does not claim `/17/...`
        let pattern = Regex::new(r"/([^/?#]+)/benchmarks/latest$")
            .expect("Listing endpoint pattern should be valid");
        Self { pattern }
    }

    /// Returns the technology id a response URL refers to, if it is a listing endpoint
    pub fn technology_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        self.pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Whether the response body for this URL is worth fetching
    pub fn is_listing(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_listing_endpoint() {
        let filter = LatestBenchmarksFilter::new();
        assert_eq!(
            filter.technology_id("https://downloads.cisecurity.org/technology/7/benchmarks/latest"),
            Some("7")
        );
        assert_eq!(
            filter.technology_id("https://example.org/api/linux-server/benchmarks/latest"),
            Some("linux-server")
        );
    }

    #[test]
    fn test_rejects_other_urls() {
        let filter = LatestBenchmarksFilter::new();
        for url in [
            "https://downloads.cisecurity.org/technology",
            "https://downloads.cisecurity.org/technology/7/benchmarks",
            "https://downloads.cisecurity.org/technology/7/benchmarks/latest/",
            "https://downloads.cisecurity.org/technology/7/benchmarks/latest?page=2",
            "https://downloads.cisecurity.org/technology/7/benchmarks/archive",
            "https://downloads.cisecurity.org/app.js",
        ] {
            assert!(!filter.is_listing(url), "should not match: {url}");
            assert_eq!(filter.technology_id(url), None);
        }
    }

    #[test]
    fn test_id_is_a_whole_segment() {
        let filter = LatestBenchmarksFilter::new();
        let url = "https://downloads.cisecurity.org/technology/17/benchmarks/latest";
        assert_eq!(filter.technology_id(url), Some("17"));
        assert_ne!(filter.technology_id(url), Some("7"));
    }
}
