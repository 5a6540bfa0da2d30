mod support;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use support::recording_client;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use leakscout_github::GithubError;

async fn mount_repo_and_branch(server: &MockServer, owner: &str, repo: &str, sha: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "default_branch": "main" })),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/repos/{owner}/{repo}/branches/main")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "commit": { "commit": { "tree": { "sha": sha } } }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn repo_tree_lists_blobs_only() {
    let server = MockServer::start().await;
    mount_repo_and_branch(&server, "acme", "widgets", "tree123").await;

    let blob_url = format!("{}/blobs/abc", server.uri());
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/git/trees/tree123"))
        .and(query_param("recursive", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "truncated": false,
            "tree": [
                { "path": "src/main.rs", "url": blob_url, "sha": "abc", "size": 120, "type": "blob" },
                { "path": "src", "url": blob_url, "sha": "def", "type": "tree" },
                { "path": "README.md", "url": blob_url, "sha": "ghi", "type": "blob" }
            ]
        })))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let files = client.repo_tree("acme", "widgets").await.unwrap();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].path, "src/main.rs");
    assert_eq!(files[0].size, Some(120));
    assert_eq!(files[1].path, "README.md");
    assert_eq!(files[1].size, None);
}

#[tokio::test]
async fn truncated_listing_warns_but_still_returns_entries() {
    let server = MockServer::start().await;
    mount_repo_and_branch(&server, "acme", "widgets", "tree123").await;

    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets/git/trees/tree123"))
        .and(query_param("recursive", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "truncated": true,
            "tree": [
                { "path": "a.txt", "url": "https://example.invalid/blob", "sha": "abc", "type": "blob" }
            ]
        })))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let files = client.repo_tree("acme", "widgets").await.unwrap();
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn missing_repository_maps_to_repo_level_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let err = client.repo_tree("acme", "ghost").await.unwrap_err();

    match err {
        GithubError::NotFound(what) => assert!(what.contains("acme/ghost")),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn repo_payload_without_default_branch_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/acme/widgets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let err = client.repo_tree("acme", "widgets").await.unwrap_err();
    assert!(matches!(err, GithubError::MalformedResponse(_)));
}

#[tokio::test]
async fn blob_text_decodes_wrapped_base64() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blobs/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": "aGVsbG8g\nd29ybGQ=\n",
            "encoding": "base64"
        })))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let url = format!("{}/blobs/abc", server.uri());
    assert_eq!(client.fetch_blob_text(&url).await.unwrap(), "hello world");
}

#[tokio::test]
async fn blob_with_unknown_encoding_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blobs/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": "plain text here",
            "encoding": "utf-8"
        })))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let url = format!("{}/blobs/abc", server.uri());
    assert_eq!(client.fetch_blob_text(&url).await.unwrap(), "");
}

#[tokio::test]
async fn undecodable_blob_content_is_empty_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blobs/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": "!!!! not base64 !!!!",
            "encoding": "base64"
        })))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let url = format!("{}/blobs/abc", server.uri());
    assert_eq!(client.fetch_blob_text(&url).await.unwrap(), "");
}

#[tokio::test]
async fn non_utf8_blob_bytes_decode_lossily() {
    let server = MockServer::start().await;
    let bytes = [0xff, 0xfe, b'h', b'i'];
    Mock::given(method("GET"))
        .and(path("/blobs/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "content": BASE64.encode(bytes),
            "encoding": "base64"
        })))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let url = format!("{}/blobs/abc", server.uri());
    let text = client.fetch_blob_text(&url).await.unwrap();
    assert!(text.ends_with("hi"));
    assert!(text.contains('\u{FFFD}'));
}

#[tokio::test]
async fn malformed_blob_payload_is_empty_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blobs/abc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json at all"))
        .mount(&server)
        .await;

    let (client, _sleeper) = recording_client(&server.uri());
    let url = format!("{}/blobs/abc", server.uri());
    assert_eq!(client.fetch_blob_text(&url).await.unwrap(), "");
}
