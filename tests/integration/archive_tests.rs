//! End-to-end archive runs against mock sites

use crate::{date, mount, mount_page, mount_page_expecting, test_archiver, MOCK_DOMAIN, STATIC_URL};
use site_archiver::archiver::ArchiverOptions;
use site_archiver::crawler::AssetType;
use site_archiver::ArchiveError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOME_PAGE: &str = r#"<html><head>
    <link rel="stylesheet" href="/css/site.css">
</head><body>
    <img src="/img/logo.png" srcset="/img/logo.png 1x, /img/logo@2x.png 2x">
    <a href="/about.html">About</a>
    <a href="https://elsewhere.example.org/">Elsewhere</a>
</body></html>"#;

async fn mount_home_site(server: &MockServer) {
    mount_page(server, "/", HOME_PAGE).await;
    mount(
        server,
        "/css/site.css",
        "text/css",
        "body { background: url('../img/bg.png'); }",
    )
    .await;
    mount(server, "/img/logo.png", "image/png", "png-bytes").await;
    mount(server, "/img/logo@2x.png", "image/png", "png2x-bytes").await;
    mount(server, "/img/bg.png", "image/png", "bg-bytes").await;
    mount_page(server, "/about.html", r#"<a href="/">Home</a>"#).await;
}

fn archived_text(
    archiver: &site_archiver::Archiver<site_archiver::SqliteBlobStore>,
    date: &str,
    path: &str,
) -> String {
    let object = archiver
        .fetch_archived(MOCK_DOMAIN, date, path)
        .unwrap()
        .unwrap_or_else(|| panic!("{} should be archived", path));
    String::from_utf8(object.body).unwrap()
}

#[tokio::test]
async fn test_archive_stores_rewritten_site() {
    let server = MockServer::start().await;
    mount_home_site(&server).await;

    let archiver = test_archiver(ArchiverOptions::default());
    let report = archiver
        .archive_on(&server.uri(), date(2024, 1, 15))
        .await
        .unwrap();

    assert_eq!(
        report.preview_url,
        "https://static.example.com/127.0.0.1/2024-01-15/index.html"
    );
    assert_eq!(report.domain, MOCK_DOMAIN);
    assert!(report.is_complete());
    assert_eq!(
        report.stored,
        vec![
            "127.0.0.1/2024-01-15/about.html",
            "127.0.0.1/2024-01-15/css/site.css",
            "127.0.0.1/2024-01-15/img/bg.png",
            "127.0.0.1/2024-01-15/img/logo.png",
            "127.0.0.1/2024-01-15/img/logo@2x.png",
            "127.0.0.1/2024-01-15/index.html",
        ]
    );
    assert_eq!(report.assets_by_type[&AssetType::Html], 2);
    assert_eq!(report.assets_by_type[&AssetType::Image], 3);

    let root = format!("{}/127.0.0.1/2024-01-15", STATIC_URL);

    let html = archived_text(&archiver, "2024-01-15", "");
    assert!(html.contains(&format!(r#"href="{}/css/site.css""#, root)));
    assert!(html.contains(&format!(r#"src="{}/img/logo.png""#, root)));
    assert!(html.contains(&format!(
        r#"srcset="{root}/img/logo.png 1x, {root}/img/logo@2x.png 2x""#,
        root = root
    )));
    assert!(html.contains(&format!(r#"href="{}/about.html""#, root)));
    assert!(html.contains(r#"href="https://elsewhere.example.org/""#));

    let css = archived_text(&archiver, "2024-01-15", "css/site.css");
    assert_eq!(
        css,
        format!(r#"body {{ background: url("{}/img/bg.png"); }}"#, root)
    );

    let about = archived_text(&archiver, "2024-01-15", "about.html");
    assert!(about.contains(&format!(r#"href="{}/index.html""#, root)));

    let logo = archiver
        .fetch_archived(MOCK_DOMAIN, "2024-01-15", "img/logo.png")
        .unwrap()
        .unwrap();
    assert_eq!(logo.body, b"png-bytes");
    assert_eq!(logo.content_type, "image/png");
    assert_eq!(logo.custom_metadata["assetType"], "image");
    assert_eq!(logo.custom_metadata["domain"], MOCK_DOMAIN);
    assert_eq!(logo.custom_metadata["archivedAt"], "2024-01-15");
    assert!(logo.custom_metadata["originalUrl"].ends_with("/img/logo.png"));
}

#[tokio::test]
async fn test_failed_asset_does_not_fail_run() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<img src="/ok.png"><img src="/missing.png"><script src="/app.js"></script>"#,
    )
    .await;
    mount(&server, "/ok.png", "image/png", "ok").await;
    mount(&server, "/app.js", "application/javascript", "console.log(1)").await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let archiver = test_archiver(ArchiverOptions::default());
    let report = archiver
        .archive_on(&server.uri(), date(2024, 1, 15))
        .await
        .unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.ends_with("/missing.png"));
    assert!(report.failures[0].reason.contains("404"));
    assert_eq!(
        report.stored,
        vec![
            "127.0.0.1/2024-01-15/app.js",
            "127.0.0.1/2024-01-15/index.html",
            "127.0.0.1/2024-01-15/ok.png",
        ]
    );
    assert!(report.preview_url.ends_with("/127.0.0.1/2024-01-15/index.html"));
}

#[tokio::test]
async fn test_slow_asset_times_out() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<img src="/slow.png">"#).await;
    Mock::given(method("GET"))
        .and(path("/slow.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let archiver = test_archiver(ArchiverOptions {
        asset_timeout: Duration::from_millis(200),
        ..ArchiverOptions::default()
    });
    let report = archiver
        .archive_on(&server.uri(), date(2024, 1, 15))
        .await
        .unwrap();

    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.ends_with("/slow.png"));
    assert_eq!(report.stored, vec!["127.0.0.1/2024-01-15/index.html"]);
}

#[tokio::test]
async fn test_cross_host_iframe_is_left_alone() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    let frame_url = format!("http://localhost:{}/frame.html", other.address().port());
    mount_page(&server, "/", &format!(r#"<iframe src="{}"></iframe>"#, frame_url)).await;
    mount_page_expecting(&other, "/frame.html", "<p>elsewhere</p>", 0).await;

    let archiver = test_archiver(ArchiverOptions::default());
    let report = archiver
        .archive_on(&server.uri(), date(2024, 1, 15))
        .await
        .unwrap();

    assert_eq!(report.skipped_external, vec![frame_url]);
    assert_eq!(report.stored, vec!["127.0.0.1/2024-01-15/index.html"]);
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_cyclic_site_archives_each_page_once() {
    let server = MockServer::start().await;

    // One fetch during discovery and one when archiving
    mount_page_expecting(&server, "/", r#"<a href="/b.html">B</a>"#, 2).await;
    mount_page_expecting(&server, "/b.html", r#"<a href="/">A</a>"#, 2).await;

    let archiver = test_archiver(ArchiverOptions::default());
    let report = archiver
        .archive_on(&server.uri(), date(2024, 1, 15))
        .await
        .unwrap();

    assert_eq!(
        report.stored,
        vec![
            "127.0.0.1/2024-01-15/b.html",
            "127.0.0.1/2024-01-15/index.html",
        ]
    );
}

#[tokio::test]
async fn test_dates_are_separate_partitions() {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<img src="/a.png">"#).await;
    mount(&server, "/a.png", "image/png", "a").await;

    let archiver = test_archiver(ArchiverOptions::default());
    archiver
        .archive_on(&server.uri(), date(2024, 1, 15))
        .await
        .unwrap();
    archiver
        .archive_on(&server.uri(), date(2024, 3, 1))
        .await
        .unwrap();
    // Re-archiving the same day overwrites in place
    archiver
        .archive_on(&server.uri(), date(2024, 3, 1))
        .await
        .unwrap();

    assert_eq!(
        archiver.list_archives(MOCK_DOMAIN),
        vec!["2024-03-01", "2024-01-15"]
    );
    assert_eq!(archiver.domain_count(), 1);

    let old = archived_text(&archiver, "2024-01-15", "index.html");
    let new = archived_text(&archiver, "2024-03-01", "index.html");
    assert!(old.contains("/127.0.0.1/2024-01-15/a.png"));
    assert!(new.contains("/127.0.0.1/2024-03-01/a.png"));
}

#[tokio::test]
async fn test_unreachable_seed_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let archiver = test_archiver(ArchiverOptions::default());
    let result = archiver.archive_on(&server.uri(), date(2024, 1, 15)).await;

    assert!(matches!(result, Err(ArchiveError::Discovery { .. })));
    assert!(archiver.list_archives(MOCK_DOMAIN).is_empty());
}

#[tokio::test]
async fn test_invalid_seed_is_an_error() {
    let archiver = test_archiver(ArchiverOptions::default());

    let result = archiver
        .archive_on("ftp://example.com/", date(2024, 1, 15))
        .await;

    assert!(matches!(result, Err(ArchiveError::Url(_))));
}
