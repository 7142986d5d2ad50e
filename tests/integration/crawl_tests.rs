use crate::support::{sorted, ScriptedDownloader};
use bfs_crawler::config::CrawlerConfig;
use bfs_crawler::crawler::WebCrawler;
use bfs_crawler::{ConfigError, PageError};
use std::time::Duration;

fn crawler(
    downloader: ScriptedDownloader,
    downloaders: usize,
    extractors: usize,
    per_host: usize,
) -> WebCrawler<ScriptedDownloader> {
    WebCrawler::with_limits(downloader, downloaders, extractors, per_host)
        .expect("valid crawler limits")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_zero_never_downloads() {
    let downloader = ScriptedDownloader::new().page("http://a/", &["http://a/x"]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 1, 1, 1);

    let result = crawler.download("http://a/", 0).await;

    assert!(result.downloaded.is_empty());
    assert!(result.errors.is_empty());
    assert_eq!(tracker.total_calls(), 0);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_single_page_without_links() {
    let downloader = ScriptedDownloader::new().page("http://a/", &[]);
    let crawler = crawler(downloader, 1, 1, 1);

    let result = crawler.download("http://a/", 1).await;

    assert_eq!(result.downloaded, vec!["http://a/"]);
    assert!(result.errors.is_empty());
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_level_tree() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://a/x", "http://b/y"])
        .page("http://a/x", &[])
        .page("http://b/y", &["http://a/"]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 4, 4, 2);

    let result = crawler.download("http://a/", 2).await;

    assert_eq!(
        sorted(result.downloaded),
        vec!["http://a/", "http://a/x", "http://b/y"]
    );
    assert!(result.errors.is_empty());
    assert_eq!(tracker.calls_for("http://a/"), 1);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_back_link_not_downloaded_again_at_greater_depth() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://a/x", "http://b/y"])
        .page("http://a/x", &["http://b/y"])
        .page("http://b/y", &["http://a/", "http://a/x"]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 4, 4, 2);

    let result = crawler.download("http://a/", 5).await;

    assert_eq!(result.downloaded.len(), 3);
    for (url, calls) in tracker.all_calls() {
        assert_eq!(calls, 1, "{} downloaded {} times", url, calls);
    }
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_download_failure_recorded() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://b/", "http://c/"])
        .failing("http://b/")
        .page("http://c/", &[]);
    let crawler = crawler(downloader, 2, 2, 2);

    let result = crawler.download("http://a/", 2).await;

    assert_eq!(sorted(result.downloaded.clone()), vec!["http://a/", "http://c/"]);
    assert_eq!(result.errors.len(), 1);
    assert!(matches!(
        result.errors.get("http://b/"),
        Some(PageError::Download(_))
    ));
    for url in &result.downloaded {
        assert!(!result.errors.contains_key(url));
    }
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_failed_page_links_never_extracted() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://b/"])
        .failing("http://b/");
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 2, 2, 2);

    crawler.download("http://a/", 3).await;

    assert_eq!(tracker.extraction_calls(), 1);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_exclusion() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://a/ok", "http://a/skip/here"])
        .page("http://a/ok", &[])
        .page("http://a/skip/here", &[]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 2, 2, 2);

    let result = crawler
        .download_excluding("http://a/", 2, &["/skip".to_string()])
        .await;

    assert_eq!(sorted(result.downloaded), vec!["http://a/", "http://a/ok"]);
    assert!(!result.errors.contains_key("http://a/skip/here"));
    assert_eq!(tracker.calls_for("http://a/skip/here"), 0);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_excluded_seed_returns_empty() {
    let downloader = ScriptedDownloader::new().page("http://a/skip", &[]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 1, 1, 1);

    let result = crawler
        .download_excluding("http://a/skip", 3, &["skip".to_string()])
        .await;

    assert!(result.is_empty());
    assert_eq!(tracker.total_calls(), 0);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_per_host_cap() {
    let links: Vec<String> = (0..100).map(|i| format!("http://a/{}", i)).collect();
    let mut downloader = ScriptedDownloader::new()
        .page_owned("http://a/", links.clone())
        .with_download_delay(Duration::from_millis(5));
    for link in &links {
        downloader = downloader.page(link, &[]);
    }
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 8, 2, 2);

    let result = crawler.download("http://a/", 2).await;

    assert_eq!(result.downloaded.len(), 101);
    assert!(result.errors.is_empty());
    assert!(tracker.peak_for_host("a") <= 2);
    assert!(tracker.peak_for_host("a") >= 1);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_downloader_pool_cap() {
    let links: Vec<String> = (0..30).map(|i| format!("http://host{}/", i)).collect();
    let mut downloader = ScriptedDownloader::new()
        .page_owned("http://seed/", links.clone())
        .with_download_delay(Duration::from_millis(5));
    for link in &links {
        downloader = downloader.page(link, &[]);
    }
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 3, 1, 10);

    let result = crawler.download("http://seed/", 2).await;

    assert_eq!(result.downloaded.len(), 31);
    assert!(tracker.peak_downloads() <= 3);
    assert!(tracker.peak_any_host() <= 1);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_extractor_pool_cap() {
    let links: Vec<String> = (0..12).map(|i| format!("http://h{}/", i)).collect();
    let mut downloader = ScriptedDownloader::new()
        .page_owned("http://seed/", links.clone())
        .with_extract_delay(Duration::from_millis(5));
    for link in &links {
        downloader = downloader.page(link, &["http://leaf/"]);
    }
    downloader = downloader.page("http://leaf/", &[]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 6, 2, 2);

    let result = crawler.download("http://seed/", 3).await;

    assert_eq!(result.downloaded.len(), 14);
    assert_eq!(tracker.extraction_calls(), 13);
    assert!(tracker.peak_extractions() <= 2);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_dense_graph_downloads_each_url_once() {
    let urls: Vec<String> = (0..10).map(|i| format!("http://h{}/p", i % 3)).collect();
    let urls: Vec<String> = urls
        .into_iter()
        .enumerate()
        .map(|(i, u)| format!("{}{}", u, i))
        .collect();
    let mut downloader = ScriptedDownloader::new()
        .page_owned("http://h0/", urls.clone())
        .with_download_delay(Duration::from_millis(1));
    for url in &urls {
        let mut links = urls.clone();
        links.push("http://h0/".to_string());
        downloader = downloader.page_owned(url, links);
    }
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 4, 4, 2);

    let result = crawler.download("http://h0/", 4).await;

    assert_eq!(result.downloaded.len(), 11);
    assert_eq!(tracker.total_calls(), 11);
    for (url, calls) in tracker.all_calls() {
        assert_eq!(calls, 1, "{} downloaded {} times", url, calls);
    }
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_depth_limits_reach() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://b/"])
        .page("http://b/", &["http://c/"])
        .page("http://c/", &["http://d/"])
        .page("http://d/", &[]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 2, 2, 1);

    let result = crawler.download("http://a/", 3).await;

    assert_eq!(
        sorted(result.downloaded),
        vec!["http://a/", "http://b/", "http://c/"]
    );
    assert_eq!(tracker.calls_for("http://d/"), 0);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shortcut_path_counts_for_depth() {
    // d is three hops away via b and c but only two via the direct link from a
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://b/", "http://d/"])
        .page("http://b/", &["http://c/"])
        .page("http://c/", &["http://d/"])
        .page("http://d/", &[]);
    let crawler = crawler(downloader, 2, 2, 1);

    let result = crawler.download("http://a/", 2).await;

    assert_eq!(sorted(result.downloaded), vec!["http://a/", "http://b/", "http://d/"]);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_extraction_failure_is_silent() {
    let downloader = ScriptedDownloader::new().broken_links("http://a/");
    let crawler = crawler(downloader, 1, 1, 1);

    let result = crawler.download("http://a/", 3).await;

    assert_eq!(result.downloaded, vec!["http://a/"]);
    assert!(result.errors.is_empty());
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_malformed_links_recorded() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["not a url", "http://b/"])
        .page("http://b/", &[]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 2, 2, 2);

    let result = crawler.download("http://a/", 2).await;

    assert_eq!(sorted(result.downloaded), vec!["http://a/", "http://b/"]);
    assert!(result.errors["not a url"].is_malformed());
    assert_eq!(tracker.calls_for("not a url"), 0);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_malformed_seed() {
    let crawler = crawler(ScriptedDownloader::new(), 1, 1, 1);

    let result = crawler.download("::not-a-url::", 2).await;

    assert!(result.downloaded.is_empty());
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors["::not-a-url::"].is_malformed());
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_panicking_download_does_not_hang_crawl() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://b/", "http://c/"])
        .panicking("http://b/")
        .page("http://c/", &[]);
    let crawler = crawler(downloader, 1, 1, 1);

    let result = tokio::time::timeout(Duration::from_secs(5), crawler.download("http://a/", 2))
        .await
        .expect("crawl hung after a panicking download");

    assert_eq!(sorted(result.downloaded), vec!["http://a/", "http://c/"]);
    assert!(!result.errors.contains_key("http://b/"));
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_nothing_changes_after_return() {
    let downloader = ScriptedDownloader::new()
        .page("http://a/", &["http://a/1", "http://a/2"])
        .page("http://a/1", &["http://a/3"])
        .page("http://a/2", &["http://a/3"])
        .page("http://a/3", &[])
        .with_download_delay(Duration::from_millis(2));
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 2, 2, 1);

    let result = crawler.download("http://a/", 2).await;
    let calls = tracker.total_calls();
    let extractions = tracker.extraction_calls();

    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(result.downloaded.len(), 3);
    assert_eq!(tracker.total_calls(), calls);
    assert_eq!(tracker.extraction_calls(), extractions);
    assert_eq!(tracker.calls_for("http://a/3"), 0);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_crawls_share_host_cap() {
    let links: Vec<String> = (0..20).map(|i| format!("http://shared/{}", i)).collect();
    let mut downloader = ScriptedDownloader::new()
        .page_owned("http://shared/", links.clone())
        .with_download_delay(Duration::from_millis(3));
    for link in &links {
        downloader = downloader.page(link, &[]);
    }
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 8, 2, 2);

    let (first, second) = tokio::join!(
        crawler.download("http://shared/", 2),
        crawler.download("http://shared/", 2)
    );

    assert_eq!(first.downloaded.len(), 21);
    assert_eq!(second.downloaded.len(), 21);
    assert!(tracker.peak_for_host("shared") <= 2);
    crawler.close().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_crawler_is_reusable() {
    let downloader = ScriptedDownloader::new().page("http://a/", &[]);
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 1, 1, 1);

    let first = crawler.download("http://a/", 1).await;
    let second = crawler.download("http://a/", 1).await;

    assert_eq!(first.downloaded, second.downloaded);
    assert_eq!(tracker.calls_for("http://a/"), 2);
    crawler.close().await;
}

#[tokio::test]
async fn test_invalid_limits_rejected() {
    let err = WebCrawler::new(ScriptedDownloader::new(), CrawlerConfig::new(2, 2, 0))
        .err()
        .expect("zero per-host cap must be rejected");
    assert!(matches!(err, ConfigError::Validation(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_close_mid_crawl_with_large_host_queue() {
    let links: Vec<String> = (0..20_000).map(|i| format!("http://a/{}", i)).collect();
    let downloader = ScriptedDownloader::new()
        .page_owned("http://a/", links)
        .with_download_delay(Duration::from_millis(20));
    let tracker = downloader.tracker();
    let crawler = crawler(downloader, 4, 1, 1);

    let (result, _) = tokio::time::timeout(
        Duration::from_secs(20),
        async {
            tokio::join!(crawler.download("http://a/", 2), async {
                tokio::time::sleep(Duration::from_millis(300)).await;
                crawler.close().await;
            })
        },
    )
    .await
    .expect("crawl hung after close");

    // Queued downloads for the host were dropped rather than run
    assert!(tracker.total_calls() < 20_001);
    assert!(result.downloaded.contains(&"http://a/".to_string()));
    assert!(result.downloaded.len() + result.errors.len() < 20_001);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_gate_reclamation_during_concurrent_crawls_keeps_cap() {
    const HOSTS: usize = 100;
    const CHAIN: usize = 60;

    let fan: Vec<String> = (0..HOSTS * 5)
        .map(|i| format!("http://h{}/fan{}", i % HOSTS, i))
        .collect();
    let mut downloader = ScriptedDownloader::new()
        .page_owned("http://h0/", fan.clone())
        .with_download_delay(Duration::from_millis(1));
    for link in &fan {
        downloader = downloader.page(link, &[]);
    }
    for i in 0..CHAIN {
        let next = format!("http://h{}/chain{}", (i + 1) % HOSTS, i + 1);
        downloader = downloader.page_owned(
            &format!("http://h{}/chain{}", i % HOSTS, i),
            vec![next],
        );
    }
    let tracker = downloader.tracker();

    let mut config = CrawlerConfig::new(8, 4, 1);
    config.host_gate_soft_cap = 1;
    let crawler = WebCrawler::new(downloader, config).expect("valid crawler limits");

    for _ in 0..5 {
        let (fan_result, chain_result) = tokio::join!(
            crawler.download("http://h0/", 2),
            crawler.download("http://h0/chain0", CHAIN as u32)
        );
        assert_eq!(fan_result.downloaded.len(), HOSTS * 5 + 1);
        assert_eq!(chain_result.downloaded.len(), CHAIN);
    }

    assert!(tracker.peak_any_host() <= 1);
    crawler.close().await;
}
