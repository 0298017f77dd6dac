//! Terminal rendering of crawl results: one two-column ASCII table per
//! page, followed by that page's warnings.

use gossamer_crawler::PageResult;

const PAGE_HEADER: &str = "PAGE";
const LINKS_HEADER: &str = "DISCOVERED URLS";

/// Renders one page result, links one per row and the literal marker
/// `None` when the page had no accepted links.
pub fn page_table(result: &PageResult) -> String {
    let page = result.url.as_str();
    let links: Vec<&str> = if result.links.is_empty() {
        vec!["None"]
    } else {
        result.links.iter().map(|url| url.as_str()).collect()
    };

    let page_width = page.len().max(PAGE_HEADER.len());
    let links_width = links
        .iter()
        .map(|link| link.len())
        .max()
        .unwrap_or(0)
        .max(LINKS_HEADER.len());

    let mut out = String::new();
    let separator = format!(
        "+{}+{}+\n",
        "-".repeat(page_width + 2),
        "-".repeat(links_width + 2)
    );

    out.push_str(&separator);
    out.push_str(&format!(
        "| {} | {} |\n",
        center(PAGE_HEADER, page_width),
        center(LINKS_HEADER, links_width)
    ));
    out.push_str(&separator);
    for (i, link) in links.iter().enumerate() {
        let page_cell = if i == 0 { page } else { "" };
        out.push_str(&format!(
            "| {page_cell:<page_width$} | {link:<links_width$} |\n"
        ));
    }
    out.push_str(&separator);
    out.push('\n');

    if !result.warnings.is_empty() {
        out.push_str(&result.warnings.join("\n"));
        out.push_str("\n\n");
    }

    out
}

fn center(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(text.len());
    let left = pad / 2;
    format!(
        "{}{}{}",
        " ".repeat(left),
        text,
        " ".repeat(pad - left)
    )
}
