//! End-to-end pipeline tests: OPML file on disk, feeds served by a mock HTTP
//! server, snapshot written to a temp directory and read back.

use chrono::{DateTime, Duration, Utc};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::PathBuf;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use secnews::category::Category;
use secnews::{output, pipeline, subscriptions};
use secnews::subscriptions::FeedSubscription;

fn rss_feed(title: &str, items: &[(&str, &str, Option<DateTime<Utc>>)]) -> String {
    let mut body = format!(
        "<?xml version=\"1.0\"?>\n<rss version=\"2.0\"><channel><title>{}</title>",
        title
    );
    for (item_title, link, published) in items {
        body.push_str("<item>");
        body.push_str(&format!("<title>{}</title>", item_title));
        body.push_str(&format!("<link>{}</link>", link));
        if let Some(p) = published {
            body.push_str(&format!("<pubDate>{}</pubDate>", p.to_rfc2822()));
        }
        body.push_str("</item>");
    }
    body.push_str("</channel></rss>");
    body
}

async fn mount_feed(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "application/xml"),
        )
        .mount(server)
        .await;
}

/// Writes an OPML file with one outline per (title, url) pair, returning the
/// tempdir (keep it alive) and the file path.
fn opml_file(feeds: &[(&str, &str)]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sec_feeds.xml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "<?xml version=\"1.0\"?>").unwrap();
    writeln!(file, "<opml version=\"2.0\"><body>").unwrap();
    for (title, url) in feeds {
        writeln!(
            file,
            "<outline type=\"rss\" text=\"{t}\" title=\"{t}\" xmlUrl=\"{u}\"/>",
            t = title,
            u = url
        )
        .unwrap();
    }
    writeln!(file, "</body></opml>").unwrap();
    (dir, path)
}

// Feed timestamps go through RFC 2822, which keeps second precision.
fn days_ago(days: i64) -> DateTime<Utc> {
    Utc::now() - Duration::days(days)
}

#[tokio::test]
async fn scenario_a_stale_entry_excluded() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/feed",
        rss_feed(
            "Malware Analysis Blog",
            &[("T", "http://e.com/p/", Some(days_ago(40)))],
        ),
    )
    .await;

    let (_dir, opml) = opml_file(&[(
        "Malware Analysis Blog",
        &format!("{}/feed", server.uri()),
    )]);
    let subs = subscriptions::load(&opml).await.unwrap();
    assert_eq!(subs.len(), 1);
    assert_eq!(subs[0].category, Category::MalwareAnalysis);

    let client = reqwest::Client::new();
    let items = pipeline::aggregate(&client, &subs, 30).await;
    assert!(items.is_empty(), "40-day-old entry must not survive a 30-day window");
}

#[tokio::test]
async fn scenario_b_recent_entry_included_with_feed_category() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/feed",
        rss_feed(
            "Malware Analysis Blog",
            &[("T", "http://e.com/p/", Some(days_ago(5)))],
        ),
    )
    .await;

    let (_dir, opml) = opml_file(&[(
        "Malware Analysis Blog",
        &format!("{}/feed", server.uri()),
    )]);
    let subs = subscriptions::load(&opml).await.unwrap();

    let client = reqwest::Client::new();
    let items = pipeline::aggregate(&client, &subs, 30).await;

    assert_eq!(items.len(), 1);
    let item = &items["http://e.com/p"];
    assert_eq!(item.title, "T");
    assert_eq!(item.category, Category::MalwareAnalysis);
    assert_eq!(item.source, "Malware Analysis Blog");
    assert!(item.published.is_some());
}

#[tokio::test]
async fn scenario_c_duplicate_link_keeps_latest_in_either_order() {
    let older = days_ago(10);
    let newer = days_ago(5);

    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/older",
        rss_feed("Feed One", &[("T1", "http://e.com/p", Some(older))]),
    )
    .await;
    mount_feed(
        &server,
        "/newer",
        rss_feed("Feed Two", &[("T2", "http://e.com/p", Some(newer))]),
    )
    .await;

    let sub = |title: &str, route: &str| FeedSubscription {
        title: title.to_string(),
        url: format!("{}{}", server.uri(), route),
        category: Category::General,
    };

    let client = reqwest::Client::new();
    for order in [
        vec![sub("Feed One", "/older"), sub("Feed Two", "/newer")],
        vec![sub("Feed Two", "/newer"), sub("Feed One", "/older")],
    ] {
        let items = pipeline::aggregate(&client, &order, 30).await;
        assert_eq!(items.len(), 1);
        let item = &items["http://e.com/p"];
        assert_eq!(item.published.unwrap().timestamp(), newer.timestamp());
        assert_eq!(item.title, "T2");
    }
}

#[tokio::test]
async fn scenario_d_undated_entry_retained_and_sorts_last() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/feed",
        rss_feed(
            "Security News",
            &[
                ("Dated", "http://e.com/dated", Some(days_ago(2))),
                ("Undated", "http://e.com/undated", None),
            ],
        ),
    )
    .await;

    let subs = vec![FeedSubscription {
        title: "Security News".to_string(),
        url: format!("{}/feed", server.uri()),
        category: Category::General,
    }];

    let client = reqwest::Client::new();
    let items = pipeline::aggregate(&client, &subs, 30).await;
    assert_eq!(items.len(), 2);
    assert!(items["http://e.com/undated"].published.is_none());

    let snapshot = output::build_snapshot(items, 30);
    assert_eq!(snapshot.items[0].link, "http://e.com/dated");
    assert_eq!(snapshot.items[1].link, "http://e.com/undated");
}

#[tokio::test]
async fn degraded_feed_warns_and_run_continues() {
    let server = MockServer::start().await;
    mount_feed(&server, "/broken", "<not a feed".to_string()).await;
    mount_feed(
        &server,
        "/good",
        rss_feed("Good Feed", &[("T", "http://e.com/ok", Some(days_ago(1)))]),
    )
    .await;

    let sub = |title: &str, route: &str| FeedSubscription {
        title: title.to_string(),
        url: format!("{}{}", server.uri(), route),
        category: Category::General,
    };
    // Broken feed first, plus one URL that fails at the HTTP level entirely.
    let subs = vec![
        sub("Broken", "/broken"),
        sub("Missing", "/definitely-404"),
        sub("Good", "/good"),
    ];

    let client = reqwest::Client::new();
    let items = pipeline::aggregate(&client, &subs, 30).await;
    assert_eq!(items.len(), 1);
    assert!(items.contains_key("http://e.com/ok"));
}

#[tokio::test]
async fn snapshot_round_trip_preserves_links_and_count() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "/feed",
        rss_feed(
            "Security News",
            &[
                ("A", "http://e.com/a", Some(days_ago(1))),
                ("B", "http://e.com/b/", Some(days_ago(2))),
                ("C", "http://e.com/c", None),
            ],
        ),
    )
    .await;

    let subs = vec![FeedSubscription {
        title: "Security News".to_string(),
        url: format!("{}/feed", server.uri()),
        category: Category::General,
    }];

    let client = reqwest::Client::new();
    let items = pipeline::aggregate(&client, &subs, 30).await;

    let mut expected_links: Vec<String> = items.keys().cloned().collect();
    expected_links.sort();
    let expected_count = items.len();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("data").join("news_recent.json");
    let snapshot = output::build_snapshot(items, 30);
    output::write_snapshot(&snapshot, &out).unwrap();

    let back: secnews::Snapshot =
        serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(back.total_items, expected_count);
    let mut links: Vec<String> = back
        .items
        .iter()
        .map(|i| pipeline::canonical_link(&i.link).to_string())
        .collect();
    links.sort();
    assert_eq!(links, expected_links);
}
