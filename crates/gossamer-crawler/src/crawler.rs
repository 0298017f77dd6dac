//! The fetch side of the traversal: HTTP download, anchor extraction,
//! and the worker pool that drains the frontier.

use anyhow::{anyhow, bail, Result};
use futures::StreamExt;
use lazy_static::lazy_static;
use scraper::{Html, Selector};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use url::Url;

use crate::config::CrawlerConfig;
use crate::filter;
use crate::frontier::Frontier;
use crate::page::{Location, PageResult};

lazy_static! {
    static ref ANCHOR: Selector = Selector::parse("a[href]").unwrap();
}

async fn fetch(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| anyhow!("Failed to get url {url}: {e}"))?;

    let status = resp.status().as_u16();
    if status >= 400 {
        bail!("{url} raised a status code {status}");
    }

    let body = resp
        .bytes()
        .await
        .map_err(|e| anyhow!("Failed to get url {url}: {e}"))?;
    Ok(body.to_vec())
}

/// Returns the raw href attribute values of the anchor elements, in
/// document order. The underlying html5ever parser recovers from
/// malformed markup, so the only parse failure left is a body that is
/// not text at all.
fn extract_anchor_hrefs(body: &[u8]) -> Result<Vec<String>> {
    let body = std::str::from_utf8(body).map_err(|e| anyhow!("{e}"))?;
    let document = Html::parse_document(body);
    Ok(document
        .select(&ANCHOR)
        .filter_map(|element| element.value().attr("href"))
        .map(str::to_owned)
        .collect())
}

/// Fetches one location, reports its result, and feeds the accepted
/// children back into the frontier. Every failure mode degrades to a
/// warning on the page result so one bad page never stops the crawl.
async fn process_location(
    client: &reqwest::Client,
    config: &CrawlerConfig,
    frontier: &Frontier,
    tx_report: &mpsc::UnboundedSender<PageResult>,
    loc: Location,
) {
    let mut warnings = Vec::new();
    let mut links: Vec<Url> = Vec::new();

    match fetch(client, &loc.url).await {
        // At the depth bound the page itself is reported but its links
        // are not followed.
        Ok(_) if loc.depth_exhausted() => {}
        Ok(body) => match extract_anchor_hrefs(&body) {
            Ok(hrefs) => {
                let (accepted, invalid) =
                    filter::partition_hrefs(&hrefs, &loc.url, &config.domain);
                links = accepted;
                if !invalid.is_empty() {
                    let invalid: Vec<String> =
                        invalid.iter().map(|href| format!("'{href}'")).collect();
                    warnings.push(format!(
                        "Warning: These URLs are invalid and will be ignored: [{}]",
                        invalid.join(", ")
                    ));
                }
            }
            Err(e) => {
                warnings.push(format!(
                    "Warning: Failed to parse html body for url {}: {e}",
                    loc.url
                ));
            }
        },
        Err(e) => {
            let on_page = loc
                .parent
                .as_ref()
                .map(|parent| format!(" on page {parent}"))
                .unwrap_or_default();
            warnings.push(format!("Warning: {e}{on_page}"));
        }
    }

    let children: Vec<Location> = links.iter().map(|url| loc.child(url.clone())).collect();

    let result = PageResult {
        url: loc.url.clone(),
        links,
        warnings,
    };
    if tx_report.send(result).is_err() {
        log::warn!("report consumer is gone, dropping result for {}", loc.url);
    }

    frontier.complete(children);
}

/// Crawls one domain to completion, emitting a [`PageResult`] per
/// distinct URL on `tx_report`. Returns once every reachable page within
/// the depth bound has been fetched exactly once; per-page failures
/// surface as warnings on their result, never as a session error.
pub async fn crawl_domain(
    config: &CrawlerConfig,
    tx_report: mpsc::UnboundedSender<PageResult>,
) -> Result<()> {
    config.validate()?;

    let client = reqwest::ClientBuilder::new()
        .gzip(true)
        .deflate(true)
        .build()?;

    let (frontier, rx_locations) = Frontier::build();
    frontier.seed(Location::root(config.domain.clone(), config.depth))?;

    let client = &client;
    let frontier = &frontier;
    let tx_report = &tx_report;
    UnboundedReceiverStream::new(rx_locations)
        .for_each_concurrent(config.parallel, |loc| async move {
            process_location(client, config, frontier, tx_report, loc).await;
            // Be a good neighbour: per-worker pause after each request.
            tokio::time::sleep(config.wait).await;
        })
        .await;

    Ok(())
}
