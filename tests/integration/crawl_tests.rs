//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site map and run full crawl
//! sessions against it, end to end, through the real reqwest transport.

use sitemap_harvest::cache::{CacheSlot, CacheStore, SqliteCache};
use sitemap_harvest::config::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, SiteConfig, UserAgentConfig,
};
use sitemap_harvest::crawler::Coordinator;
use sitemap_harvest::state::CrawlPhase;
use sitemap_harvest::{FetchResponse, HarvestError, UrlStructure};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the given site map
fn create_test_config(site_map_url: &str, dir: &TempDir) -> Config {
    Config {
        crawler: CrawlerConfig {
            site_map_url: site_map_url.to_string(),
            cache_key: "recipes".to_string(),
            url_cache_key: "recipes-pages".to_string(),
            read_structure_cache: false,
            read_response_cache: false,
            debug_mode: false,
            fetch_limit: None,
        },
        fetch: FetchConfig {
            max_concurrent_requests: 4,
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            cache_path: dir.path().join("cache.db").to_string_lossy().into_owned(),
            html_dir: dir.path().join("html").to_string_lossy().into_owned(),
        },
        site: SiteConfig {
            index_pattern: "/sitemap".to_string(),
            content_pattern: "/recipes/".to_string(),
            max_depth: 3,
        },
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// Mounts a two-level site map: the root links one sub-index and one
/// non-content page; the sub-index lists two recipes, one of which
/// serves a body that cannot be decoded.
async fn mount_site(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sitemap"))
        .respond_with(html(
            r#"<a href="/sitemap/2014">2014</a><a href="/about">About</a>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap/2014"))
        .respond_with(html(
            r#"<a href="/recipes/1">Pie</a><a href="/recipes/2">Stew</a>"#,
        ))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/recipes/1"))
        .respond_with(html("<h1>Pie</h1>"))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/recipes/2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0xfd]))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(html("<p>About us</p>"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_populates_both_cache_slots() {
    let server = MockServer::start().await;
    mount_site(&server).await;
    let base = server.uri();

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/sitemap", base), &dir);

    let report = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.discovered_urls, 3);
    assert_eq!(report.fetch_tasks, 3);
    assert_eq!(report.fetched, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.phases.last(), Some(&CrawlPhase::Done));

    let cache = SqliteCache::new(&config.output.cache_path).unwrap();

    let structure: UrlStructure = cache.get("recipes", CacheSlot::Structure).unwrap();
    let content = structure.group("content").unwrap();
    assert_eq!(
        content[&format!("{}/recipes", base)],
        vec![format!("{}/recipes/1", base), format!("{}/recipes/2", base)]
    );
    let other = structure.group("other").unwrap();
    assert_eq!(other[&format!("{}/", base)], vec![format!("{}/about", base)]);

    let mut responses: Vec<FetchResponse> =
        cache.get("recipes-pages", CacheSlot::Responses).unwrap();
    responses.sort_by(|a, b| a.url.cmp(&b.url));

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0].url, format!("{}/about", base));
    assert_eq!(responses[1].url, format!("{}/recipes/1", base));
    assert!(responses[1].body.contains("<h1>Pie</h1>"));

    let context = responses[1].context.as_ref().unwrap();
    assert_eq!(context["group"], "content");
    assert_eq!(context["parent"], format!("{}/recipes", base));
}

#[tokio::test]
async fn test_cached_rerun_sends_no_requests() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/sitemap", server.uri()), &dir);

    let first = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();
    server.reset().await;

    config.crawler.read_structure_cache = true;
    config.crawler.read_response_cache = true;
    let mut coordinator = Coordinator::new(config).unwrap();
    let second = coordinator.run().await.unwrap();

    assert!(second.structure_from_cache);
    assert!(second.responses_from_cache);
    assert_eq!(coordinator.responses().unwrap().len(), first.fetched);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_structure_cache_reused_for_fresh_fetch() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/sitemap", server.uri()), &dir);
    Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/recipes/1"))
        .respond_with(html("<h1>Pie v2</h1>"))
        .mount(&server)
        .await;

    config.crawler.read_structure_cache = true;
    let report = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap();

    // Unmatched paths now answer 404, which still counts as a response
    assert_eq!(report.fetched, 3);
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/sitemap")));

    let cache = SqliteCache::new(&config.output.cache_path).unwrap();
    let responses: Vec<FetchResponse> =
        cache.get("recipes-pages", CacheSlot::Responses).unwrap();
    let pie = responses
        .iter()
        .find(|r| r.url.ends_with("/recipes/1"))
        .unwrap();
    assert!(pie.body.contains("Pie v2"));
}

#[tokio::test]
async fn test_debug_mode_dumps_pages() {
    let server = MockServer::start().await;
    mount_site(&server).await;

    let dir = TempDir::new().unwrap();
    let mut config = create_test_config(&format!("{}/sitemap", server.uri()), &dir);
    config.crawler.debug_mode = true;

    let report = Coordinator::new(config).unwrap().run().await.unwrap();

    assert_eq!(report.pages_written, 2);
    let page = dir.path().join("html").join("recipes").join("recipes_1.html");
    assert!(std::fs::read_to_string(page).unwrap().contains("<h1>Pie</h1>"));
}

#[tokio::test]
async fn test_unreachable_site_map_caches_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sitemap"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xc3, 0x28]))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&format!("{}/sitemap", server.uri()), &dir);

    let err = Coordinator::new(config.clone())
        .unwrap()
        .run()
        .await
        .unwrap_err();
    assert!(matches!(err, HarvestError::Discovery(_)));

    let cache = SqliteCache::new(&config.output.cache_path).unwrap();
    assert!(cache.entries().unwrap().is_empty());
}
