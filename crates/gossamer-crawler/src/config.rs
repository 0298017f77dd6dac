use std::time::Duration;

use anyhow::bail;
use serde::{Deserialize, Serialize};
use url::Url;

/// Configuration of one crawl session, immutable for its duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlerConfig {
    /// Root domain to crawl, an absolute URL without a path.
    pub domain: Url,

    /// How many link hops to follow from the root, 0 meaning unlimited.
    #[serde(default)]
    pub depth: usize,

    /// Number of concurrent fetch workers.
    #[serde(default = "default_parallel")]
    pub parallel: usize,

    /// Per-worker delay applied after each processed page.
    #[serde(default = "default_wait")]
    pub wait: Duration,
}

impl CrawlerConfig {
    pub fn new(domain: Url) -> Self {
        Self {
            domain,
            depth: 0,
            parallel: default_parallel(),
            wait: default_wait(),
        }
    }

    /// Fails fast on invariants the CLI layer should already have
    /// enforced: a well-formed path-free root and a positive worker
    /// count.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.domain.host_str().is_none() {
            bail!("domain must be an absolute URL with a host");
        }
        if !matches!(self.domain.path(), "" | "/") {
            bail!("domain must not contain a path component");
        }
        if self.parallel == 0 {
            bail!("parallel must be a positive integer");
        }
        Ok(())
    }
}

fn default_parallel() -> usize {
    5
}

fn default_wait() -> Duration {
    Duration::from_secs(1)
}
