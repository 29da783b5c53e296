//! Integration tests for the registry HTTP client using wiremock
//!
//! The client is blocking, so each exchange runs on a blocking thread while
//! the mock server is driven by the test runtime.

use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tagbox_inventory::error::Error;
use tagbox_inventory::registry::{HttpRegistryClient, RegistryClient, RegistryEndpoints};

const TOKEN: &str = "test-token";

fn client_for(base: &str) -> HttpRegistryClient {
    let endpoints = RegistryEndpoints {
        host_list_url: Url::parse(&format!("{}/api/hosts", base)).unwrap(),
        tag_list_url: Url::parse(&format!("{}/api/tags", base)).unwrap(),
        token: TOKEN.to_string(),
    };
    HttpRegistryClient::new(endpoints, Duration::from_secs(5)).expect("valid client")
}

async fn fetch_hosts(base: String, selector: &'static str) -> Result<Vec<String>, Error> {
    tokio::task::spawn_blocking(move || client_for(&base).fetch_hosts_for_selector(selector))
        .await
        .expect("blocking task panicked")
}

async fn fetch_tags(
    base: String,
    hosts: &'static [&'static str],
) -> Result<Vec<(String, String)>, Error> {
    tokio::task::spawn_blocking(move || {
        client_for(&base)
            .fetch_tags_for_batch(hosts)
            .map(|tags| tags.into_iter().collect())
    })
    .await
    .expect("blocking task panicked")
}

fn json_body(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "application/json")
}

// ============================================================================
// Host list endpoint
// ============================================================================

mod host_list {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_hosts_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/hosts"))
            .and(query_param("token", TOKEN))
            .and(query_param("tag", "service.web"))
            .respond_with(json_body(r#"{"hosts": ["web02", "web01"]}"#))
            .expect(1)
            .mount(&mock_server)
            .await;

        let hosts = fetch_hosts(mock_server.uri(), "service.web")
            .await
            .expect("should fetch hosts");

        assert_eq!(hosts, vec!["web02", "web01"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_non_200_is_response_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/hosts"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let err = fetch_hosts(mock_server.uri(), "service.web")
            .await
            .unwrap_err();

        match &err {
            Error::Response { status, url, .. } => {
                assert_eq!(*status, 503);
                assert!(!url.contains(TOKEN));
            }
            other => panic!("expected Response, got {:?}", other),
        }
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_hosts_array_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/hosts"))
            .respond_with(json_body(r#"{"items": ["web01"]}"#))
            .mount(&mock_server)
            .await;

        let err = fetch_hosts(mock_server.uri(), "service.web")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }
}

// ============================================================================
// Tag list endpoint
// ============================================================================

mod tag_list {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_tags_joins_hosts_and_keeps_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .and(query_param("token", TOKEN))
            .and(query_param("hosts", "web02_web01"))
            .respond_with(json_body(
                r#"{"succ": 0, "tag_list": {"web02": "service.web", "web01": "service.web_env.prod"}}"#,
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let tags = fetch_tags(mock_server.uri(), &["web02", "web01"])
            .await
            .expect("should fetch tags");

        assert_eq!(
            tags,
            vec![
                ("web02".to_string(), "service.web".to_string()),
                ("web01".to_string(), "service.web_env.prod".to_string()),
            ]
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_failure_flag_is_query_error_with_note() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(json_body(r#"{"succ": 1, "err_note": "invalid token"}"#))
            .mount(&mock_server)
            .await;

        let err = fetch_tags(mock_server.uri(), &["web01"]).await.unwrap_err();

        match &err {
            Error::Query { note, .. } => assert_eq!(note, "invalid token"),
            other => panic!("expected Query, got {:?}", other),
        }
        assert_eq!(err.exit_code(), 4);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_tag_list_is_query_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(json_body(r#"{"succ": 0, "tag_list": {}}"#))
            .mount(&mock_server)
            .await;

        let err = fetch_tags(mock_server.uri(), &["web01"]).await.unwrap_err();

        assert!(matches!(err, Error::Query { .. }));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_tag_list_is_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(json_body(r#"{"succ": 0}"#))
            .mount(&mock_server)
            .await;

        let err = fetch_tags(mock_server.uri(), &["web01"]).await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_not_modified_passes_status_check_but_has_no_body() {
        let mock_server = MockServer::start().await;

        // HTTP forbids a body on 304, so the payload never reaches the client
        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(304).set_body_raw(
                br#"{"succ": 0, "tag_list": {"web01": "service.web"}}"#.to_vec(),
                "application/json",
            ))
            .expect(1)
            .mount(&mock_server)
            .await;

        let err = fetch_tags(mock_server.uri(), &["web01"]).await.unwrap_err();

        assert!(matches!(err, Error::Decode(_)), "got {:?}", err);
        assert_eq!(err.exit_code(), 5);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_server_error_is_response_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/tags"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let err = fetch_tags(mock_server.uri(), &["web01"]).await.unwrap_err();

        assert!(matches!(err, Error::Response { status: 500, .. }));
    }
}

// ============================================================================
// Transport
// ============================================================================

#[test]
fn test_unreachable_registry_is_transport_error() {
    let client = client_for("http://127.0.0.1:1");

    let err = client.fetch_hosts_for_selector("service.web").unwrap_err();

    assert!(matches!(err, Error::Transport { .. }));
    assert!(!err.to_string().contains(TOKEN));
    assert_eq!(err.exit_code(), 3);
}
