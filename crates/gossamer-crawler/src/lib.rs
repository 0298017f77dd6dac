mod config;
mod crawler;
mod filter;
mod frontier;
mod page;

pub use config::CrawlerConfig;
pub use crawler::crawl_domain;
pub use frontier::Frontier;
pub use page::{Location, PageResult};

pub use anyhow;
