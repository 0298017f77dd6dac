use serde::Serialize;
use url::Url;

/// One unit of crawl work: a page to fetch, the page it was discovered
/// on, and how many more link hops are allowed below it.
#[derive(Debug, Clone)]
pub struct Location {
    pub url: Url,
    pub parent: Option<Url>,
    /// Remaining depth budget, 0 meaning unbounded.
    pub depth_remaining: usize,
}

impl Location {
    pub fn root(url: Url, depth: usize) -> Self {
        Self {
            url,
            parent: None,
            depth_remaining: depth,
        }
    }

    /// A child location discovered on this page. An unbounded budget (0)
    /// propagates unchanged, otherwise the child gets one hop less.
    pub fn child(&self, url: Url) -> Self {
        let depth_remaining = match self.depth_remaining {
            0 => 0,
            d => d - 1,
        };
        Self {
            url,
            parent: Some(self.url.clone()),
            depth_remaining,
        }
    }

    /// Whether the depth budget is spent: the page itself is still
    /// fetched and reported, but none of its links are followed.
    pub fn depth_exhausted(&self) -> bool {
        self.depth_remaining == 1
    }
}

/// The reported outcome of fetching one distinct URL.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub url: Url,
    /// Accepted same-domain links, in document order.
    pub links: Vec<Url>,
    /// Non-fatal problems encountered while fetching or parsing.
    pub warnings: Vec<String>,
}
