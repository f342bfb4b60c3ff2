//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use site_archiver::config::load_config;
use site_archiver::storage::{open_archive, PageRecord, PageStore};
use site_archiver::{run_crawl, Archive, CrawlConfig, Crawler, SqliteStorage};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Wraps body markup in a minimal HTML document
fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><body>{}</body></html>", body),
        "text/html; charset=utf-8",
    )
}

async fn mount(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn mount_once(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_never(server: &MockServer, route: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html("should not be fetched"))
        .expect(0)
        .mount(server)
        .await;
}

fn archive() -> Arc<Archive> {
    Arc::new(Archive::new(
        SqliteStorage::new_in_memory().expect("in-memory database"),
    ))
}

fn config(seed: &str, max_depth: u32, max_pages: usize) -> CrawlConfig {
    CrawlConfig::new(seed, max_depth, max_pages)
        .with_workers(4)
        .with_request_timeout(Duration::from_secs(5))
}

fn page(archive: &Archive, url: &str) -> Option<PageRecord> {
    archive
        .with_store(|s| s.get_page_by_url(url))
        .expect("page query")
}

fn page_count(archive: &Archive) -> u64 {
    archive.with_store(|s| s.count_total_pages()).unwrap()
}

fn fetched_count(archive: &Archive) -> u64 {
    archive.with_store(|s| s.count_fetched_pages()).unwrap()
}

fn link_count(archive: &Archive) -> u64 {
    archive.with_store(|s| s.count_links()).unwrap()
}

#[tokio::test]
async fn test_external_links_excluded() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_once(
        &server,
        "/",
        html(r#"<p>Home</p><a href="/a">A</a><a href="http://other.com/b">B</a>"#),
    )
    .await;
    mount_once(&server, "/a", html("<p>Page A</p>")).await;

    let archive = archive();
    let report = run_crawl(config(&base, 1, 0), Arc::clone(&archive))
        .await
        .expect("crawl should run");

    assert_eq!(page_count(&archive), 2);
    assert_eq!(link_count(&archive), 1);
    assert_eq!(report.pages_scheduled, 2);
    assert_eq!(report.pages_fetched, 2);
    assert!(!report.cancelled);

    let seed = page(&archive, &format!("{}/", base)).expect("seed stored");
    assert!(seed.text.contains("Home"));
    assert!(!seed.is_stub());
    let a = page(&archive, &format!("{}/a", base)).expect("/a stored");
    assert_eq!(a.text, "Page A");
    assert!(page(&archive, "http://other.com/b").is_none());

    let links = archive
        .with_store(|s| s.get_outgoing_links(&format!("{}/", base)))
        .unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].to_url, format!("{}/a", base));
}

#[tokio::test]
async fn test_external_links_recorded_when_allowed() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Port 9 is not expected to be listening, so the external fetch fails fast
    mount_once(
        &server,
        "/",
        html(r#"<a href="http://127.0.0.2:9/elsewhere">out</a>"#),
    )
    .await;

    let archive = archive();
    let report = run_crawl(
        config(&base, 1, 0).with_exclude_external_links(false),
        Arc::clone(&archive),
    )
    .await
    .unwrap();

    assert_eq!(report.pages_scheduled, 2);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(link_count(&archive), 1);

    let stub = page(&archive, "http://127.0.0.2:9/elsewhere").expect("stub stored");
    assert!(stub.is_stub());
}

#[tokio::test]
async fn test_seed_without_scheme() {
    let server = MockServer::start().await;
    let host_and_port = server.uri().trim_start_matches("http://").to_string();

    mount_once(&server, "/", html("<p>bare seed</p>")).await;

    let archive = archive();
    let report = run_crawl(config(&host_and_port, 1, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.pages_fetched, 1);
    assert!(page(&archive, &format!("{}/", server.uri())).is_some());
}

#[tokio::test]
async fn test_unreachable_seed_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html("<p>too late</p>").set_delay(Duration::from_secs(3)))
        .expect(1)
        .mount(&server)
        .await;

    let archive = archive();
    let crawl = config(&server.uri(), 2, 0).with_request_timeout(Duration::from_secs(1));
    let report = run_crawl(crawl, Arc::clone(&archive)).await.unwrap();

    assert_eq!(report.pages_scheduled, 1);
    assert_eq!(report.pages_fetched, 0);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(page_count(&archive), 0);
    assert_eq!(link_count(&archive), 0);
}

#[tokio::test]
async fn test_connection_refused_seed() {
    let archive = archive();
    let report = run_crawl(config("http://127.0.0.1:9/", 1, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.pages_scheduled, 1);
    assert_eq!(report.fetch_failures, 1);
    assert_eq!(page_count(&archive), 0);
}

#[tokio::test]
async fn test_self_link_not_refetched() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html(r##"<a href="/">me</a><a href="#top">top</a><a href="/a">a</a>"##),
    )
    .await;
    mount_once(&server, "/a", html(r#"<a href="/">back</a>"#)).await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 3, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.pages_scheduled, 2);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(link_count(&archive), 1);
    assert_eq!(report.already_visited, 2);
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
    )
    .await;
    mount_once(
        &server,
        "/",
        html(r#"<a href="/public">pub</a><a href="/private/x">priv</a>"#),
    )
    .await;
    mount_once(&server, "/public", html("<p>open</p>")).await;
    mount_never(&server, "/private/x").await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 2, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.robots_denied, 1);
    assert_eq!(report.pages_fetched, 2);
    assert!(page(&archive, &format!("{}/private/x", server.uri())).is_none());
}

#[tokio::test]
async fn test_robots_forbidden_denies_whole_site() {
    let server = MockServer::start().await;

    mount(&server, "/robots.txt", ResponseTemplate::new(403)).await;
    mount_once(&server, "/", html(r#"<a href="/a">a</a><a href="/b">b</a>"#)).await;
    mount_never(&server, "/a").await;
    mount_never(&server, "/b").await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 2, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.robots_denied, 2);
    assert_eq!(report.pages_scheduled, 1);
    assert_eq!(page_count(&archive), 1);
}

#[tokio::test]
async fn test_robots_rules_apply_to_seed_site_only() {
    let server = MockServer::start().await;

    mount(
        &server,
        "/robots.txt",
        ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
    )
    .await;
    mount_once(
        &server,
        "/",
        html(r#"<a href="http://127.0.0.2:9/private/x">elsewhere</a>"#),
    )
    .await;

    let archive = archive();
    let report = run_crawl(
        config(&server.uri(), 1, 0).with_exclude_external_links(false),
        Arc::clone(&archive),
    )
    .await
    .unwrap();

    assert_eq!(report.robots_denied, 0);
    assert_eq!(report.pages_scheduled, 2);
    assert!(page(&archive, "http://127.0.0.2:9/private/x").is_some());
}

#[tokio::test]
async fn test_robots_server_error_allows_all() {
    let server = MockServer::start().await;

    mount(&server, "/robots.txt", ResponseTemplate::new(500)).await;
    mount_once(&server, "/", html(r#"<a href="/a">a</a>"#)).await;
    mount_once(&server, "/a", html("<p>a</p>")).await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 1, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.robots_denied, 0);
    assert_eq!(report.pages_fetched, 2);
}

#[tokio::test]
async fn test_depth_limit() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html(r#"<a href="/1">1</a>"#)).await;
    mount_once(&server, "/1", html(r#"<a href="/2">2</a>"#)).await;
    mount_once(&server, "/2", html(r#"<a href="/3">3</a>"#)).await;
    mount_never(&server, "/3").await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 2, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.pages_scheduled, 3);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(page_count(&archive), 3);
    assert_eq!(link_count(&archive), 2);
    assert!(page(&archive, &format!("{}/3", server.uri())).is_none());
}

#[tokio::test]
async fn test_page_budget() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html(r#"<a href="/a">a</a><a href="/b">b</a><a href="/c">c</a><a href="/d">d</a>"#),
    )
    .await;
    mount_once(&server, "/a", html("<p>a</p>")).await;
    mount_once(&server, "/b", html("<p>b</p>")).await;
    mount_never(&server, "/c").await;
    mount_never(&server, "/d").await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 3, 3), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.pages_scheduled, 3);
    assert_eq!(report.budget_dropped, 2);
    assert_eq!(page_count(&archive), 3);
    assert_eq!(link_count(&archive), 2);
}

#[tokio::test]
async fn test_budget_of_one_fetches_only_seed() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html(r#"<a href="/a">a</a>"#)).await;
    mount_never(&server, "/a").await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 3, 1), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.pages_scheduled, 1);
    assert_eq!(page_count(&archive), 1);
    assert_eq!(link_count(&archive), 0);
}

#[tokio::test]
async fn test_non_html_not_parsed() {
    let server = MockServer::start().await;

    mount_once(&server, "/", html(r#"<a href="/doc.pdf">pdf</a>"#)).await;
    mount_once(
        &server,
        "/doc.pdf",
        ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"),
    )
    .await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 2, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.content_mismatches, 1);
    assert_eq!(report.pages_fetched, 1);
    assert_eq!(page_count(&archive), 2);
    assert_eq!(fetched_count(&archive), 1);

    let pdf = page(&archive, &format!("{}/doc.pdf", server.uri())).unwrap();
    assert!(pdf.is_stub());
}

#[tokio::test]
async fn test_http_errors_do_not_stop_crawl() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        html(r#"<a href="/gone">gone</a><a href="/broken">broken</a><a href="/ok">ok</a>"#),
    )
    .await;
    mount_once(&server, "/gone", ResponseTemplate::new(404)).await;
    mount_once(&server, "/broken", ResponseTemplate::new(500)).await;
    mount_once(&server, "/ok", html("<p>fine</p>")).await;

    let archive = archive();
    let report = run_crawl(config(&server.uri(), 1, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(report.fetch_failures, 2);
    assert_eq!(report.pages_fetched, 2);
    assert_eq!(link_count(&archive), 3);
}

#[tokio::test]
async fn test_every_page_fetched_once_with_many_workers() {
    let server = MockServer::start().await;
    let pages = 30;

    // Every page links to every other page
    let all_links: String = (0..pages)
        .map(|i| format!(r#"<a href="/p{}">{}</a>"#, i, i))
        .collect();

    mount_once(&server, "/", html(&all_links)).await;
    for i in 0..pages {
        mount_once(&server, &format!("/p{}", i), html(&all_links)).await;
    }

    let archive = archive();
    let report = run_crawl(
        config(&server.uri(), 3, 0).with_workers(16),
        Arc::clone(&archive),
    )
    .await
    .unwrap();

    assert_eq!(report.pages_scheduled, pages + 1);
    assert_eq!(report.pages_fetched, pages + 1);
    assert_eq!(page_count(&archive), (pages + 1) as u64);
    assert_eq!(link_count(&archive), pages as u64);
}

#[tokio::test]
async fn test_recrawl_keeps_one_row_per_page() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(r#"<p>home</p><a href="/a">a</a>"#))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html("<p>a</p>"))
        .expect(2)
        .mount(&server)
        .await;

    let archive = archive();
    run_crawl(config(&server.uri(), 1, 0), Arc::clone(&archive))
        .await
        .unwrap();
    run_crawl(config(&server.uri(), 1, 0), Arc::clone(&archive))
        .await
        .unwrap();

    assert_eq!(page_count(&archive), 2);
    assert_eq!(link_count(&archive), 1);
}

#[tokio::test]
async fn test_cancelled_crawl_reports_cancellation() {
    let server = MockServer::start().await;
    mount_never(&server, "/").await;

    let token = CancellationToken::new();
    token.cancel();

    let archive = archive();
    let report = Crawler::new(config(&server.uri(), 2, 0), Arc::clone(&archive))
        .with_cancellation(token)
        .run()
        .await
        .unwrap();

    assert!(report.cancelled);
    assert_eq!(report.pages_fetched, 0);
    assert_eq!(page_count(&archive), 0);
}

#[tokio::test]
async fn test_cancel_during_crawl_stops_further_fetches() {
    let server = MockServer::start().await;
    let seed_url = format!("{}/", server.uri());

    mount_once(&server, "/", html(r#"<a href="/slow">slow</a>"#)).await;
    mount(
        &server,
        "/slow",
        html(r#"<a href="/deeper">deeper</a>"#).set_delay(Duration::from_secs(2)),
    )
    .await;
    mount_never(&server, "/deeper").await;

    let token = CancellationToken::new();
    let archive = archive();
    let crawler = Crawler::new(config(&seed_url, 3, 0), Arc::clone(&archive))
        .with_cancellation(token.clone());

    // Cancel as soon as the seed has been stored
    let cancel_after_seed = async {
        while page(&archive, &seed_url).is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        token.cancel();
    };

    let (report, ()) = tokio::time::timeout(
        Duration::from_secs(10),
        async { tokio::join!(crawler.run(), cancel_after_seed) },
    )
    .await
    .expect("cancelled crawl should stop");
    let report = report.unwrap();

    assert!(report.cancelled);
    assert!(report.pages_scheduled <= 2);
    assert!(page(&archive, &format!("{}/deeper", server.uri())).is_none());
}

#[tokio::test]
async fn test_declared_charset_respected() {
    let server = MockServer::start().await;

    mount_once(
        &server,
        "/",
        ResponseTemplate::new(200).set_body_raw(
            b"<html><body><p>caf\xE9</p></body></html>".to_vec(),
            "text/html; charset=iso-8859-1",
        ),
    )
    .await;

    let archive = archive();
    run_crawl(config(&server.uri(), 1, 0), Arc::clone(&archive))
        .await
        .unwrap();

    let seed = page(&archive, &format!("{}/", server.uri())).unwrap();
    assert_eq!(seed.text, "café");
}

#[tokio::test]
async fn test_crawl_from_config_file_into_disk_archive() {
    let server = MockServer::start().await;
    mount_once(&server, "/", html(r#"<p>from file</p><a href="/a">a</a>"#)).await;
    mount_once(&server, "/a", html("<p>a</p>")).await;

    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("archive.db");
    let config_path = dir.path().join("archiver.toml");

    std::fs::write(
        &config_path,
        format!(
            r#"
[crawler]
seed = "{}"
max-depth = 1
workers = 2

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"

[output]
database-path = "{}"
"#,
            server.uri(),
            db_path.display()
        ),
    )
    .unwrap();

    let config = load_config(&config_path).expect("config should load");
    let archive = Arc::new(open_archive(db_path.as_path()).unwrap());

    let report = run_crawl(CrawlConfig::from_config(&config), Arc::clone(&archive))
        .await
        .unwrap();
    assert_eq!(report.pages_fetched, 2);
    drop(archive);

    let reopened = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(reopened.count_total_pages().unwrap(), 2);
    assert_eq!(reopened.count_links().unwrap(), 1);
}
