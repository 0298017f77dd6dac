//! End-to-end crawls against a mock HTTP server.

use std::time::Duration;

use gossamer_crawler::{crawl_domain, CrawlerConfig, PageResult};
use tokio::sync::mpsc;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body.to_string())
        .insert_header("content-type", "text/html")
}

async fn serve(server: &MockServer, page_path: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Runs a session with `parallel = 1` (deterministic output order) and
/// no inter-request delay, collecting every reported page.
async fn crawl_collect(server: &MockServer, depth: usize) -> Vec<PageResult> {
    let config = CrawlerConfig {
        domain: Url::parse(&server.uri()).unwrap(),
        depth,
        parallel: 1,
        wait: Duration::ZERO,
    };

    let (tx_report, mut rx_report) = mpsc::unbounded_channel();
    let session = crawl_domain(&config, tx_report);
    let collector = async {
        let mut results = Vec::new();
        while let Some(result) = rx_report.recv().await {
            results.push(result);
        }
        results
    };

    let (res, results) = tokio::join!(session, collector);
    res.expect("session should complete without a configuration error");
    results
}

fn link_strings(result: &PageResult) -> Vec<&str> {
    result.links.iter().map(Url::as_str).collect()
}

#[tokio::test]
async fn internal_links_are_followed_and_externals_dropped() {
    let server = MockServer::start().await;
    let base = server.uri();

    serve(
        &server,
        "/",
        r#"<a href="/a">a</a><a href="http://external.test/">out</a>"#,
    )
    .await;
    serve(&server, "/a", "<p>leaf</p>").await;

    let results = crawl_collect(&server, 0).await;
    assert_eq!(results.len(), 2);

    assert_eq!(results[0].url.as_str(), format!("{base}/"));
    assert_eq!(link_strings(&results[0]), vec![format!("{base}/a")]);
    assert!(results[0].warnings.is_empty());

    assert_eq!(results[1].url.as_str(), format!("{base}/a"));
    assert!(results[1].links.is_empty());
    assert!(results[1].warnings.is_empty());

    // The external link is neither a result nor an accepted child.
    assert!(results
        .iter()
        .all(|r| !r.url.as_str().contains("external.test")));
}

#[tokio::test]
async fn depth_one_fetches_only_the_root() {
    let server = MockServer::start().await;
    serve(&server, "/", r#"<a href="/a">a</a>"#).await;
    serve(&server, "/a", "<p>never fetched</p>").await;

    let results = crawl_collect(&server, 1).await;
    assert_eq!(results.len(), 1);
    assert!(results[0].links.is_empty());
    assert!(results[0].warnings.is_empty());
}

#[tokio::test]
async fn cyclic_graphs_terminate() {
    let server = MockServer::start().await;
    serve(&server, "/", r#"<a href="/a">a</a>"#).await;
    serve(&server, "/a", r#"<a href="/">home</a>"#).await;

    let results = crawl_collect(&server, 0).await;
    let urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(results.len(), 2, "each page fetched once, got {urls:?}");
}

#[tokio::test]
async fn page_with_two_parents_is_fetched_once() {
    let server = MockServer::start().await;
    serve(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    serve(&server, "/a", r#"<a href="/c">c</a>"#).await;
    serve(&server, "/b", r#"<a href="/c">c</a>"#).await;
    serve(&server, "/c", "<p>leaf</p>").await;

    let results = crawl_collect(&server, 0).await;
    assert_eq!(results.len(), 4);
    let c_count = results
        .iter()
        .filter(|r| r.url.path() == "/c")
        .count();
    assert_eq!(c_count, 1);

    // Both /a and /b still report /c as a discovered link.
    for p in ["/a", "/b"] {
        let page = results.iter().find(|r| r.url.path() == p).unwrap();
        assert_eq!(page.links[0].path(), "/c");
    }
}

#[tokio::test]
async fn disallowed_schemes_are_never_enqueued() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        r##"<a href="mailto:a@b.com">mail</a>
           <a href="#frag">frag</a>
           <a href="javascript:void(0)">js</a>"##,
    )
    .await;

    let results = crawl_collect(&server, 0).await;
    assert_eq!(results.len(), 1);
    assert!(results[0].links.is_empty());
    assert!(results[0].warnings.is_empty());
}

#[tokio::test]
async fn fetch_failure_degrades_to_a_warning() {
    let server = MockServer::start().await;
    serve(&server, "/", r#"<a href="/missing">gone</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let results = crawl_collect(&server, 0).await;
    assert_eq!(results.len(), 2);

    let missing = &results[1];
    assert!(missing.links.is_empty());
    assert_eq!(missing.warnings.len(), 1);
    assert!(missing.warnings[0].contains("raised a status code 404"));
    assert!(
        missing.warnings[0].contains("on page"),
        "warning should name the referring page: {}",
        missing.warnings[0]
    );
}

#[tokio::test]
async fn non_utf8_body_degrades_to_a_parse_warning() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0x00, 0x80]),
        )
        .mount(&server)
        .await;

    let results = crawl_collect(&server, 0).await;
    assert_eq!(results.len(), 1);
    assert!(results[0].links.is_empty());
    assert_eq!(results[0].warnings.len(), 1);
    assert!(results[0].warnings[0].contains("Failed to parse html body"));
}

#[tokio::test]
async fn invalid_hrefs_are_warned_and_skipped() {
    let server = MockServer::start().await;
    serve(
        &server,
        "/",
        r#"<a href="http://[">broken</a><a href="/a">a</a>"#,
    )
    .await;
    serve(&server, "/a", "<p>leaf</p>").await;

    let results = crawl_collect(&server, 0).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].warnings.len(), 1);
    assert!(results[0]
        .warnings[0]
        .contains("These URLs are invalid and will be ignored: ['http://[']"));
    assert_eq!(results[0].links.len(), 1);
}

#[tokio::test]
async fn parallel_sessions_share_nothing() {
    let server = MockServer::start().await;
    serve(&server, "/", r#"<a href="/a">a</a>"#).await;
    serve(&server, "/a", "<p>leaf</p>").await;

    // Two sessions over the same domain must each visit every page:
    // visited state is scoped to the session, not the process.
    let first = crawl_collect(&server, 0).await;
    let second = crawl_collect(&server, 0).await;
    assert_eq!(first.len(), 2);
    assert_eq!(second.len(), 2);
}

#[tokio::test]
async fn wide_graph_with_many_workers_terminates() {
    let server = MockServer::start().await;
    let fan_out: String = (0..20)
        .map(|i| format!(r#"<a href="/p{i}">p{i}</a>"#))
        .collect();
    serve(&server, "/", &fan_out).await;
    for i in 0..20 {
        // Every leaf links back to the root and to a sibling.
        serve(
            &server,
            &format!("/p{i}"),
            &format!(r#"<a href="/">home</a><a href="/p{}">next</a>"#, (i + 1) % 20),
        )
        .await;
    }

    let config = CrawlerConfig {
        domain: Url::parse(&server.uri()).unwrap(),
        depth: 0,
        parallel: 8,
        wait: Duration::ZERO,
    };
    let (tx_report, mut rx_report) = mpsc::unbounded_channel();
    let session = crawl_domain(&config, tx_report);
    let collector = async {
        let mut results = Vec::new();
        while let Some(result) = rx_report.recv().await {
            results.push(result);
        }
        results
    };
    let (res, results) = tokio::join!(session, collector);
    res.unwrap();

    // 21 distinct pages, each exactly once, in whatever order the
    // workers got to them.
    assert_eq!(results.len(), 21);
    let mut urls: Vec<_> = results.iter().map(|r| r.url.as_str()).collect();
    urls.sort_unstable();
    urls.dedup();
    assert_eq!(urls.len(), 21);
}

#[tokio::test]
async fn config_errors_fail_before_any_fetch() {
    let config = CrawlerConfig {
        domain: Url::parse("http://site.test/some/path").unwrap(),
        depth: 0,
        parallel: 1,
        wait: Duration::ZERO,
    };
    let (tx_report, mut rx_report) = mpsc::unbounded_channel();
    assert!(crawl_domain(&config, tx_report).await.is_err());
    assert!(rx_report.recv().await.is_none(), "no partial crawl occurs");
}
