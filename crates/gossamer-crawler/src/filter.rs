//! Pure link eligibility rules: which hrefs discovered on a page become
//! crawl candidates, which are dropped, and which are worth a warning.

use url::Url;

/// Hrefs that are never worth resolving: non-http schemes and
/// fragment/query-only references.
const DISALLOWED_PREFIXES: &[&str] = &[
    "mailto:",
    "gossamer://",
    "tel:",
    "?",
    "#",
    "ftp://",
    "file://",
    "telnet://",
    "gopher://",
    "javascript:",
];

pub fn has_disallowed_prefix(href: &str) -> bool {
    DISALLOWED_PREFIXES
        .iter()
        .any(|prefix| href.starts_with(prefix))
}

/// Resolves an href against the page it was found on.
pub fn resolve(origin: &Url, href: &str) -> Result<Url, url::ParseError> {
    origin.join(href)
}

/// A resolved URL is external when its scheme+host does not match the
/// crawled domain. Relative hrefs resolve onto the origin and are
/// internal by construction.
pub fn is_external(url: &Url, domain: &Url) -> bool {
    url.scheme() != domain.scheme()
        || url.host_str() != domain.host_str()
        || url.port_or_known_default() != domain.port_or_known_default()
}

/// Runs the hrefs of one page through the filter in document order.
/// Returns the accepted same-domain URLs plus the hrefs that failed to
/// resolve (reported upstream as an invalid-URL warning). Disallowed
/// prefixes and external links are dropped silently.
pub fn partition_hrefs(hrefs: &[String], origin: &Url, domain: &Url) -> (Vec<Url>, Vec<String>) {
    let mut accepted = Vec::new();
    let mut invalid = Vec::new();

    for href in hrefs {
        if has_disallowed_prefix(href) {
            continue;
        }
        let url = match resolve(origin, href) {
            Ok(url) => url,
            Err(_) => {
                invalid.push(href.clone());
                continue;
            }
        };
        if is_external(&url, domain) {
            log::debug!("dropping external link {url}");
            continue;
        }
        accepted.push(url);
    }

    (accepted, invalid)
}
