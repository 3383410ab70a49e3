//! Integration tests for the feed client and the full sweep
//!
//! These tests use wiremock to stand in for a Discuit server and run the
//! client and the harvester against it end-to-end.

use discuit_sweep::config::{
    Config, CrawlerConfig, FeedConfig, OutputConfig, ReportConfig, UserAgentConfig, WindowConfig,
};
use discuit_sweep::feed::{fetch_all_comments, DiscuitClient, FeedSource};
use discuit_sweep::output::{report_context, write_outputs};
use discuit_sweep::{Harvester, SweepError};
use serde_json::{json, Value};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointed at the mock server
fn create_test_config(base_url: &str) -> Config {
    Config {
        feed: FeedConfig {
            base_url: base_url.to_string(),
            community_id: None,
            sort: "activity".to_string(),
            start_cursor: String::new(),
        },
        window: WindowConfig {
            from_date: "20240816".to_string(),
            to_date: "20240823".to_string(),
        },
        crawler: CrawlerConfig {
            request_delay_ms: 0,
            redo_batch_size: 10,
            max_rescan_iterations: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestSweep".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        report: ReportConfig {
            top_n: 10,
            ignored_users: vec!["autobot".to_string()],
            last_report_url: None,
        },
        output: OutputConfig::default(),
    }
}

fn post_json(id: &str, user: &str, created: &str, activity: &str, comments: u64) -> Value {
    json!({
        "id": format!("internal-{}", id),
        "publicId": id,
        "type": "text",
        "communityName": "general",
        "username": user,
        "title": format!("Post {}", id),
        "createdAt": created,
        "lastActivityAt": activity,
        "noComments": comments,
    })
}

fn comment_json(id: &str, user: &str, created: &str) -> Value {
    json!({
        "id": id,
        "username": user,
        "createdAt": created,
        "editedAt": null,
        "deletedAt": null,
    })
}

#[tokio::test]
async fn test_feed_page_request_shape() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("sort", "activity"))
        .and(query_param("next", "1724000000000000000"))
        .and(query_param("communityId", "c9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post_json("p1", "alice", "2024-08-20T10:00:00Z", "2024-08-21T10:00:00Z", 0)],
            "next": 1723900000000000000u64,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut config = create_test_config(&mock_server.uri());
    config.feed.community_id = Some("c9".to_string());
    let client = DiscuitClient::new(&config.feed, &config.user_agent).unwrap();

    let page = client.fetch_feed_page("1724000000000000000").await.unwrap();

    assert_eq!(page.posts.len(), 1);
    assert_eq!(page.posts[0].public_id, "p1");
    assert_eq!(page.next.as_deref(), Some("1723900000000000000"));
}

#[tokio::test]
async fn test_null_posts_and_cursor_mean_end_of_feed() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "posts": null, "next": null })),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let client = DiscuitClient::new(&config.feed, &config.user_agent).unwrap();

    let page = client.fetch_feed_page("").await.unwrap();
    assert!(page.posts.is_empty());
    assert!(page.next.is_none());
}

#[tokio::test]
async fn test_comment_pagination_follows_detail_then_comments_endpoint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "publicId": "abc123",
            "comments": [comment_json("c1", "alice", "2024-08-18T06:00:00Z")],
            "commentsNext": "page2",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/posts/abc123/comments"))
        .and(query_param("next", "page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comments": [comment_json("c2", "bob", "2024-08-19T06:00:00Z")],
            "next": "page3",
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/posts/abc123/comments"))
        .and(query_param("next", "page3"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "comments": [], "next": "page4" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let client = DiscuitClient::new(&config.feed, &config.user_agent).unwrap();

    let comments = fetch_all_comments(&client, "abc123").await.unwrap();
    let ids: Vec<&str> = comments.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let client = DiscuitClient::new(&config.feed, &config.user_agent).unwrap();

    let err = client.fetch_feed_page("").await.unwrap_err();
    assert!(matches!(err, SweepError::Status { status: 503, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_undecodable_body_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let client = DiscuitClient::new(&config.feed, &config.user_agent).unwrap();

    let err = client.fetch_feed_page("").await.unwrap_err();
    assert!(matches!(err, SweepError::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_user_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/_initial"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "noUsers": 321, "communities": [] })),
        )
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri());
    let client = DiscuitClient::new(&config.feed, &config.user_agent).unwrap();

    assert_eq!(client.fetch_user_count().await.unwrap(), 321);
}

#[tokio::test]
async fn test_full_sweep_picks_up_bumped_post() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // Forward pass: the first feed request only
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [
                post_json("p1", "alice", "2024-08-20T10:00:00Z", "2024-08-21T10:00:00Z", 0),
                post_json("p0", "carol", "2024-08-01T10:00:00Z", "2024-08-10T10:00:00Z", 0),
            ],
            "next": "1723284000000000000",
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    // Rescans: abc123 has been bumped to the top
    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [
                post_json("abc123", "dave", "2024-08-18T09:00:00Z", "2024-08-22T09:00:00Z", 2),
                post_json("p1", "alice", "2024-08-20T10:00:00Z", "2024-08-21T10:00:00Z", 0),
            ],
            "next": null,
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/posts/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "publicId": "abc123",
            "comments": [
                comment_json("c1", "erin", "2024-08-18T12:00:00Z"),
                comment_json("c2", "autobot", "2024-08-22T09:00:00Z"),
            ],
            "commentsNext": null,
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/_initial"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "noUsers": 42 })))
        .mount(&mock_server)
        .await;

    let temp_dir = TempDir::new().unwrap();
    let summary_path = temp_dir.path().join("summary.md");
    let database_path = temp_dir.path().join("records.db");

    let mut config = create_test_config(&base_url);
    config.output = OutputConfig {
        summary_path: Some(summary_path.to_string_lossy().to_string()),
        database_path: Some(database_path.to_string_lossy().to_string()),
    };

    let mut harvester =
        Harvester::from_config(config.clone()).expect("Failed to create harvester");
    let outcome = harvester.run().await.expect("Sweep failed");

    assert!(outcome.forward.reached_time_limit);
    assert_eq!(outcome.forward.pages_fetched, 1);
    assert!(outcome.rescan.converged);
    assert_eq!(outcome.rescan.iterations, 2);
    assert_eq!(outcome.rescan.redo.len(), 1);

    let registered = harvester.source().fetch_user_count().await.ok();
    let store = harvester.into_store();
    assert!(store.contains_post("p1"));
    assert!(!store.contains_post("p0"));
    assert!(store.contains_post("abc123"));
    assert!(store.contains_comment("abc123", "c1"));
    assert!(store.contains_comment("abc123", "c2"));
    assert_eq!(store.len(), 4);

    let ctx = report_context(&config, registered).unwrap();
    let written = write_outputs(&store, &config, &ctx).expect("Failed to write outputs");
    assert_eq!(written, 2);

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("# Discuit week in review: 20240816-20240823"));
    assert!(summary.contains("3 users discussed 2 posts in 1 comments over 1 total discs."));
    assert!(summary.contains("there were 42 accounts"));
    assert!(summary.contains(&format!("{}/general/post/abc123", base_url)));

    let conn = rusqlite::Connection::open(&database_path).unwrap();
    let bots: i64 = conn
        .query_row("SELECT COUNT(*) FROM records WHERE is_bot = 1", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(bots, 1);
}

#[tokio::test]
async fn test_non_numeric_cursor_aborts_rescan() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .and(query_param("next", "not-a-number"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "posts": [], "next": null })))
        .with_priority(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post_json("p1", "alice", "2024-08-20T10:00:00Z", "2024-08-21T10:00:00Z", 0)],
            "next": "not-a-number",
        })))
        .mount(&mock_server)
        .await;

    let mut harvester = Harvester::from_config(create_test_config(&mock_server.uri()))
        .expect("Failed to create harvester");

    let err = harvester.run().await.unwrap_err();
    assert!(matches!(err, SweepError::MalformedCursor(ref c) if c == "not-a-number"));
    assert!(harvester.store().contains_post("p1"));
}

#[tokio::test]
async fn test_failed_fetch_aborts_sweep() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "posts": [post_json("p1", "alice", "2024-08-20T10:00:00Z", "2024-08-21T10:00:00Z", 3)],
            "next": null,
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/posts/p1"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let mut harvester = Harvester::from_config(create_test_config(&mock_server.uri()))
        .expect("Failed to create harvester");

    let err = harvester.run().await.unwrap_err();
    assert!(matches!(err, SweepError::Status { status: 404, .. }));
}
