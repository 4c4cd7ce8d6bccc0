//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use sift_crawl::config::{load_config, Config};
use sift_crawl::crawler::{crawl_swarm, CrawlOutcome, Crawler};
use sift_crawl::storage::CACHE_DB_FILE;
use sift_crawl::{CrawlReport, CrawlStatus};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a private cache directory
fn create_test_config(seeds: Vec<String>, limit: usize, threshold: i64, dir: &TempDir) -> Config {
    let mut config = Config::new(seeds, limit, threshold);
    config.cache_dir = dir.path().join("cache");
    config.workers = 1;
    config.request_timeout_secs = 5;
    config
}

/// An HTML page whose body is `text` followed by one anchor per link
fn html_page(text: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    let body = format!(
        "<html><head><title>Test</title></head><body><p>{}</p>{}</body></html>",
        text, anchors
    );
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_page(server: &MockServer, route: &str, text: &str, links: &[&str], hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html_page(text, links))
        .expect(hits)
        .mount(server)
        .await;
}

fn completed(outcome: CrawlOutcome) -> CrawlReport {
    match outcome {
        CrawlOutcome::Completed(report) => report,
        CrawlOutcome::Failed(reason) => panic!("crawl failed: {}", reason),
    }
}

fn accepted_paths(report: &CrawlReport) -> Vec<String> {
    let mut paths: Vec<String> = report
        .accepted
        .iter()
        .map(|m| m.url.as_url().path().to_string())
        .collect();
    paths.sort();
    paths
}

#[tokio::test]
async fn test_limit_stops_crawl() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/a", "algorithm", &["/b", "/c", "/d"], 1).await;
    mount_page(&server, "/b", "algorithm", &[], 1).await;
    mount_page(&server, "/c", "algorithm", &[], 1).await;
    mount_page(&server, "/d", "algorithm", &[], 0).await;

    let mut config = create_test_config(vec![format!("{}/a", server.uri())], 3, 1, &dir);
    config.terms = vec!["algorithm".to_string()];

    let mut crawler = Crawler::new(config);
    let report = completed(crawler.crawl().await);

    assert_eq!(report.processed, 3);
    assert_eq!(report.accepted_count(), 3);
    assert_eq!(accepted_paths(&report), vec!["/a", "/b", "/c"]);
    assert_eq!(crawler.status(), CrawlStatus::Completed);
}

#[tokio::test]
async fn test_missing_seed_completes_with_zero() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(vec![format!("{}/missing", server.uri())], 10, 1, &dir);
    let report = completed(Crawler::new(config).crawl().await);

    assert_eq!(report.processed, 1);
    assert_eq!(report.accepted_count(), 0);
    assert_eq!(report.soft_failures(), 1);
    assert!(report.failures[0].to_string().contains("404"));
}

#[tokio::test]
async fn test_only_relevant_pages_are_expanded() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Seed has no matches at all and is still accepted
    mount_page(&server, "/seed", "nothing here", &["/relevant", "/irrelevant"], 1).await;
    mount_page(
        &server,
        "/relevant",
        "data structure data pattern",
        &["/deeper"],
        1,
    )
    .await;
    mount_page(&server, "/irrelevant", "data only once", &["/never"], 1).await;
    mount_page(&server, "/deeper", "data data data", &[], 1).await;
    mount_page(&server, "/never", "data data data", &[], 0).await;

    let mut config = create_test_config(vec![format!("{}/seed", server.uri())], 50, 3, &dir);
    config.terms = vec!["data".to_string(), "structure".to_string(), "pattern".to_string()];

    let report = completed(Crawler::new(config).crawl().await);

    assert_eq!(report.processed, 4);
    assert_eq!(accepted_paths(&report), vec!["/deeper", "/relevant", "/seed"]);

    let relevant = report
        .accepted
        .iter()
        .find(|m| m.url.as_url().path() == "/relevant")
        .unwrap();
    assert_eq!(relevant.match_count, 4);
}

#[tokio::test]
async fn test_stop_terms_take_precedence() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/seed", "the", &["/child"], 1).await;
    mount_page(&server, "/child", "the the the the", &["/grandchild"], 1).await;
    mount_page(&server, "/grandchild", "the", &[], 0).await;

    let mut config = create_test_config(vec![format!("{}/seed", server.uri())], 10, 1, &dir);
    config.terms = vec!["the".to_string()];
    config.stop_terms = vec!["the".to_string()];

    let report = completed(Crawler::new(config).crawl().await);

    assert_eq!(report.processed, 2);
    assert_eq!(accepted_paths(&report), vec!["/seed"]);
}

#[tokio::test]
async fn test_empty_terms_accepts_only_seeds() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/one", "algorithm", &["/child"], 1).await;
    mount_page(&server, "/two", "algorithm", &[], 1).await;
    mount_page(&server, "/child", "algorithm", &[], 1).await;

    let config = create_test_config(
        vec![format!("{}/one", server.uri()), format!("{}/two", server.uri())],
        10,
        1,
        &dir,
    );

    let report = completed(Crawler::new(config).crawl().await);

    assert_eq!(report.processed, 3);
    assert_eq!(accepted_paths(&report), vec!["/one", "/two"]);
}

#[tokio::test]
async fn test_no_duplicate_fetches() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Every spelling of /b normalizes to the same URL, and /b links back
    mount_page(
        &server,
        "/a",
        "graph",
        &["/b", "/b/", "/b#section", "/b?utm_source=feed", "/a"],
        1,
    )
    .await;
    mount_page(&server, "/b", "graph", &["/a", "/c"], 1).await;
    mount_page(&server, "/c", "graph", &["/a", "/b"], 1).await;

    let mut config = create_test_config(vec![format!("{}/a", server.uri())], 100, 1, &dir);
    config.terms = vec!["graph".to_string()];
    config.workers = 4;

    let report = completed(Crawler::new(config).crawl().await);

    assert_eq!(report.processed, 3);
    assert_eq!(report.accepted_count(), 3);
}

#[tokio::test]
async fn test_duplicate_seeds_collapse() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/start", "graph", &[], 1).await;

    let uri = server.uri();
    let mut config = create_test_config(
        vec![
            format!("{}/start", uri),
            format!("{}/start/", uri),
            format!("{}/start#intro", uri),
        ],
        10,
        1,
        &dir,
    );
    config.workers = 3;

    let report = completed(Crawler::new(config).crawl().await);

    assert_eq!(report.processed, 1);
    assert_eq!(report.accepted_count(), 1);
}

#[tokio::test]
async fn test_limit_holds_with_many_workers() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let children: Vec<String> = (0..30).map(|i| format!("/page{}", i)).collect();
    let child_refs: Vec<&str> = children.iter().map(String::as_str).collect();

    mount_page(&server, "/hub", "crawl", &child_refs, 1).await;
    Mock::given(method("GET"))
        .respond_with(html_page("crawl crawl", &["/hub"]))
        .mount(&server)
        .await;

    let mut config = create_test_config(vec![format!("{}/hub", server.uri())], 7, 1, &dir);
    config.terms = vec!["crawl".to_string()];
    config.workers = 8;

    let report = completed(Crawler::new(config).crawl().await);

    assert_eq!(report.processed, 7);
    assert_eq!(report.accepted_count(), 7);
    assert_eq!(server.received_requests().await.unwrap().len(), 7);
}

#[tokio::test]
async fn test_second_run_uses_cache() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/cached", "algorithm", &[], 1).await;

    let config = create_test_config(vec![format!("{}/cached", server.uri())], 5, 1, &dir);

    let first = completed(Crawler::new(config.clone()).crawl().await);
    assert_eq!(first.cache_hits, 0);

    let second = completed(Crawler::new(config).crawl().await);
    assert_eq!(second.cache_hits, 1);
    assert_eq!(second.accepted_count(), 1);
}

#[tokio::test]
async fn test_cache_limit_evicts_least_recent() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/a", "text", &[], 2).await;
    mount_page(&server, "/b", "text", &[], 1).await;

    let mut config_a = create_test_config(vec![format!("{}/a", server.uri())], 5, 1, &dir);
    config_a.cache_limit = 1;
    let mut config_b = config_a.clone();
    config_b.seeds = vec![format!("{}/b", server.uri())];

    completed(Crawler::new(config_a.clone()).crawl().await);
    completed(Crawler::new(config_b).crawl().await);
    let third = completed(Crawler::new(config_a).crawl().await);

    assert_eq!(third.cache_hits, 0);
    assert_eq!(third.accepted_count(), 1);
}

#[tokio::test]
async fn test_crawl_twice_restarts_fresh() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/a", "graph", &["/b"], 1).await;
    mount_page(&server, "/b", "graph", &[], 1).await;

    let mut config = create_test_config(vec![format!("{}/a", server.uri())], 10, 1, &dir);
    config.terms = vec!["graph".to_string()];

    let mut crawler = Crawler::new(config);
    let first = completed(crawler.crawl().await);
    let second = completed(crawler.crawl().await);

    assert_eq!(first.processed, 2);
    assert_eq!(second.processed, 2);
    assert_eq!(second.cache_hits, 2);
    assert_eq!(crawler.status(), CrawlStatus::Completed);
}

#[tokio::test]
async fn test_corrupt_cache_fails_without_fetching() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/a", "text", &[], 0).await;

    let config = create_test_config(vec![format!("{}/a", server.uri())], 10, 1, &dir);
    std::fs::create_dir_all(&config.cache_dir).unwrap();
    std::fs::write(config.cache_dir.join(CACHE_DB_FILE), vec![b'x'; 4096]).unwrap();

    let mut crawler = Crawler::new(config);
    let outcome = crawler.crawl().await;

    assert!(matches!(outcome, CrawlOutcome::Failed(_)));
    assert_eq!(crawler.status(), CrawlStatus::Failed);
}

#[tokio::test]
async fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(vec!["ftp://example.com/".to_string()], 10, 1, &dir);
    config.workers = 2;

    let mut crawler = Crawler::new(config);
    let outcome = crawler.crawl().await;

    assert!(matches!(outcome, CrawlOutcome::Failed(_)));
    assert_eq!(crawler.status(), CrawlStatus::Failed);
}

#[tokio::test]
async fn test_crawl_from_config_file_writes_summary() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/start", "Rust rust RUST", &["/next"], 1).await;
    mount_page(&server, "/next", "rust and more rust", &[], 1).await;

    let summary = dir.path().join("out").join("report.md");
    let config_path = dir.path().join("sift.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
url = ["{uri}/start"]
limit = 10
match = 2
terms = ["Rust"]
stop-terms = ["and"]
cache-dir = "{cache}"
summary-path = "{summary}"
"#,
            uri = server.uri(),
            cache = dir.path().join("cache").display(),
            summary = summary.display(),
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.terms, vec!["rust".to_string()]);

    let report = completed(Crawler::new(config).crawl().await);
    assert_eq!(report.accepted_count(), 2);

    let markdown = std::fs::read_to_string(&summary).unwrap();
    assert!(markdown.contains(&format!("{}/start", server.uri())));
    assert!(markdown.contains(&format!("{}/next", server.uri())));
}

#[tokio::test]
async fn test_swarm_runs_one_crawl_per_seed() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(&server, "/left", "term", &["/left/child"], 1).await;
    mount_page(&server, "/left/child", "term", &[], 1).await;
    mount_page(&server, "/right", "term", &[], 1).await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let mut config = create_test_config(
        vec![
            format!("{}/left", server.uri()),
            format!("{}/right", server.uri()),
            format!("{}/gone", server.uri()),
        ],
        10,
        1,
        &dir,
    );
    config.terms = vec!["term".to_string()];

    let results = crawl_swarm(config).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].seed.ends_with("/left"));
    assert_eq!(results[0].outcome.accepted_count(), Some(2));
    assert_eq!(results[1].outcome.accepted_count(), Some(1));
    assert_eq!(results[2].outcome.accepted_count(), Some(0));
}
