//! Discovery tests against mock sites

use crate::{mount, mount_page, mount_page_expecting};
use site_archiver::crawler::{Asset, AssetType, Crawler};
use site_archiver::ArchiveError;
use std::collections::HashSet;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn crawler(server: &MockServer, max_depth: u32) -> Crawler {
    Crawler::new(reqwest::Client::new(), &server.uri(), max_depth)
        .expect("Failed to create crawler")
}

#[tokio::test]
async fn test_discovers_pages_and_assets() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<html><head>
            <link rel="stylesheet" href="/css/site.css">
            <link rel="icon" href="/favicon.ico">
            <script src="/js/app.js"></script>
        </head><body>
            <img src="/img/logo.png">
            <a href="/about.html">About</a>
            <a href="mailto:hi@example.com">Mail</a>
        </body></html>"#,
    )
    .await;
    mount(&server, "/css/site.css", "text/css", "body { background: url(../img/bg.jpg); }").await;
    mount_page(&server, "/about.html", r#"<img src="/img/team.webp">"#).await;

    let assets = crawler(&server, 5).discover().await.unwrap();

    let by_path: Vec<(&str, AssetType)> = assets
        .iter()
        .map(|asset| (asset.path.as_str(), asset.asset_type))
        .collect();

    assert_eq!(by_path[0], ("/index.html", AssetType::Html));
    assert!(by_path.contains(&("/css/site.css", AssetType::Css)));
    assert!(by_path.contains(&("/img/bg.jpg", AssetType::Image)));
    assert!(by_path.contains(&("/favicon.ico", AssetType::Icon)));
    assert!(by_path.contains(&("/js/app.js", AssetType::Js)));
    assert!(by_path.contains(&("/img/logo.png", AssetType::Image)));
    assert!(by_path.contains(&("/about.html", AssetType::Html)));
    assert!(by_path.contains(&("/img/team.webp", AssetType::Image)));
    assert_eq!(assets.len(), 8);
    assert!(assets.iter().all(|asset| !asset.is_external));
}

#[tokio::test]
async fn test_shared_assets_registered_once() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<img src="/shared.png"><img src="/shared.png?v=2#x"><a href="/other.html">o</a>"#,
    )
    .await;
    mount_page(&server, "/other.html", r#"<img src="/shared.png">"#).await;

    let assets = crawler(&server, 5).discover().await.unwrap();

    let urls: HashSet<&str> = assets.iter().map(|asset| asset.url.as_str()).collect();
    assert_eq!(urls.len(), assets.len());

    let shared = assets
        .iter()
        .filter(|asset| asset.url.ends_with("/shared.png"))
        .count();
    assert_eq!(shared, 1);
}

#[tokio::test]
async fn test_rediscovery_yields_same_assets() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    let frame_url = format!("http://localhost:{}/frame.html", other.address().port());
    mount_page(
        &server,
        "/",
        &format!(
            r#"<link rel="stylesheet" href="/site.css">
            <img src="/logo.png" srcset="/logo-2x.png 2x">
            <iframe src="{}"></iframe>
            <a href="/docs/">Docs</a>"#,
            frame_url
        ),
    )
    .await;
    mount(&server, "/site.css", "text/css", "h1 { background: url(/bg.gif); }").await;
    mount_page(&server, "/docs/", r#"<script src="/docs/app.js"></script><a href="/">Home</a>"#)
        .await;

    let snapshot = |assets: Vec<Asset>| -> HashSet<(String, AssetType, String, bool)> {
        assets
            .into_iter()
            .map(|asset| (asset.url, asset.asset_type, asset.path, asset.is_external))
            .collect()
    };

    let first = snapshot(crawler(&server, 5).discover().await.unwrap());
    let second = snapshot(crawler(&server, 5).discover().await.unwrap());

    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cyclic_links_terminate() {
    let server = MockServer::start().await;

    mount_page_expecting(&server, "/", r#"<a href="/b.html">B</a>"#, 1).await;
    mount_page_expecting(
        &server,
        "/b.html",
        r#"<a href="/">A</a><a href="/b.html#top">B again</a>"#,
        1,
    )
    .await;

    let assets = crawler(&server, 5).discover().await.unwrap();

    let paths: Vec<&str> = assets.iter().map(|asset| asset.path.as_str()).collect();
    assert_eq!(paths, vec!["/index.html", "/b.html"]);
}

#[tokio::test]
async fn test_max_depth_limits_pages() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/one.html">1</a>"#).await;
    mount_page(&server, "/one.html", r#"<a href="/two.html">2</a>"#).await;
    mount_page_expecting(&server, "/two.html", "<p>too deep</p>", 0).await;

    let assets = crawler(&server, 1).discover().await.unwrap();

    let paths: Vec<&str> = assets.iter().map(|asset| asset.path.as_str()).collect();
    assert_eq!(paths, vec!["/index.html", "/one.html"]);
}

#[tokio::test]
async fn test_same_host_iframe_is_crawled() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<iframe src="/embed/widget"></iframe>"#).await;
    mount_page(&server, "/embed/widget", r#"<img src="/embed/w.svg">"#).await;

    let assets = crawler(&server, 5).discover().await.unwrap();

    let widget = assets
        .iter()
        .find(|asset| asset.url.ends_with("/embed/widget"))
        .expect("iframe page should be discovered");
    assert_eq!(widget.asset_type, AssetType::Html);
    assert_eq!(widget.path, "/embed/widget/index.html");
    assert!(!widget.is_external);
    assert!(assets.iter().any(|asset| asset.path == "/embed/w.svg"));
}

#[tokio::test]
async fn test_cross_host_iframe_recorded_not_fetched() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    let frame_url = format!("http://localhost:{}/frame.html", other.address().port());
    mount_page(
        &server,
        "/",
        &format!(r#"<iframe src="{}"></iframe><a href="{}">x</a>"#, frame_url, frame_url),
    )
    .await;
    mount_page_expecting(&other, "/frame.html", "<p>elsewhere</p>", 0).await;

    let assets = crawler(&server, 5).discover().await.unwrap();

    let external: Vec<_> = assets.iter().filter(|asset| asset.is_external).collect();
    assert_eq!(external.len(), 1);
    assert_eq!(external[0].url, frame_url);
    assert_eq!(external[0].asset_type, AssetType::Iframe);
}

#[tokio::test]
async fn test_failing_subpage_is_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/gone.html">gone</a><img src="/a.png">"#).await;
    Mock::given(method("GET"))
        .and(path("/gone.html"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let assets = crawler(&server, 5).discover().await.unwrap();

    assert!(assets.iter().all(|asset| !asset.url.ends_with("/gone.html")));
    assert!(assets.iter().any(|asset| asset.path == "/a.png"));
}

#[tokio::test]
async fn test_seed_failure_fails_discovery() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = crawler(&server, 5).discover().await;

    assert!(matches!(result, Err(ArchiveError::Discovery { .. })));
}
