use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use gofile_relay::core::ProgressSample;
use gofile_relay::{GofileClient, ProgressTracker, RelayError};

async fn create_test_file(name: &str, size: usize) -> PathBuf {
    let path = std::env::temp_dir().join(format!(
        "gofile-relay-test-{}-{}",
        std::process::id(),
        name
    ));
    tokio::fs::write(&path, vec![0xA5u8; size]).await.unwrap();
    path
}

async fn cleanup_test_file(path: &PathBuf) {
    let _ = tokio::fs::remove_file(path).await;
}

#[tokio::test]
async fn picks_one_of_the_advertised_servers() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/servers")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":{"servers":[{"name":"store1"},{"name":"store2"},{"name":"store3"}]}}"#)
        .create_async()
        .await;

    let client = GofileClient::with_api_base(server.url());
    let name = client.pick_server().await.unwrap();

    assert!(["store1", "store2", "store3"].contains(&name.as_str()));
    mock.assert_async().await;
}

#[tokio::test]
async fn empty_server_list_is_a_protocol_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/servers")
        .with_status(200)
        .with_body(r#"{"data":{"servers":[]}}"#)
        .create_async()
        .await;

    let client = GofileClient::with_api_base(server.url());
    let err = client.pick_server().await.unwrap_err();

    assert!(matches!(err, RelayError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_server_list_is_a_protocol_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/servers")
        .with_status(200)
        .with_body("not json at all")
        .create_async()
        .await;

    let client = GofileClient::with_api_base(server.url());
    let err = client.pick_server().await.unwrap_err();

    assert!(matches!(err, RelayError::Protocol(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_discovery_endpoint_is_a_network_error() {
    // Nothing listens on the discard port.
    let client = GofileClient::with_api_base("http://127.0.0.1:9");
    let err = client.pick_server().await.unwrap_err();

    assert!(matches!(err, RelayError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn failing_discovery_carries_the_status_code() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/servers")
        .with_status(503)
        .with_body("maintenance")
        .create_async()
        .await;

    let client = GofileClient::with_api_base(server.url());
    let err = client.pick_server().await.unwrap_err();

    assert!(
        matches!(err, RelayError::Server { status_code: 503, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn upload_returns_the_download_page() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/uploadFile")
        .match_header(
            "content-type",
            mockito::Matcher::Regex("^multipart/form-data".to_string()),
        )
        .with_status(200)
        .with_body(r#"{"data":{"downloadPage":"https://gofile.io/d/abc123"}}"#)
        .create_async()
        .await;

    let path = create_test_file("upload-ok.bin", 8 * 1024).await;
    let client = GofileClient::with_api_base(server.url());
    let link = client
        .upload_to(&format!("{}/uploadFile", server.url()), &path, "demo.bin", None)
        .await
        .unwrap();

    assert_eq!(link.as_str(), "https://gofile.io/d/abc123");
    mock.assert_async().await;
    cleanup_test_file(&path).await;
}

#[tokio::test]
async fn upload_response_without_download_page_is_a_protocol_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/uploadFile")
        .with_status(200)
        .with_body(r#"{"data":{"status":"ok"}}"#)
        .create_async()
        .await;

    let path = create_test_file("upload-bad-shape.bin", 1024).await;
    let client = GofileClient::with_api_base(server.url());
    let err = client
        .upload_to(&format!("{}/uploadFile", server.url()), &path, "demo.bin", None)
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Protocol(_)), "got {err:?}");
    cleanup_test_file(&path).await;
}

#[tokio::test]
async fn provider_500_fails_the_upload() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/uploadFile")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let path = create_test_file("upload-500.bin", 1024).await;
    let client = GofileClient::with_api_base(server.url());
    let err = client
        .upload_to(&format!("{}/uploadFile", server.url()), &path, "demo.bin", None)
        .await
        .unwrap_err();

    assert!(
        matches!(err, RelayError::Server { status_code: 500, .. }),
        "got {err:?}"
    );
    cleanup_test_file(&path).await;
}

#[tokio::test]
async fn missing_local_file_is_an_io_error() {
    let client = GofileClient::with_api_base("http://127.0.0.1:9");
    let err = client
        .upload_to(
            "http://127.0.0.1:9/uploadFile",
            std::path::Path::new("/definitely/not/here.bin"),
            "demo.bin",
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, RelayError::Io(_)), "got {err:?}");
}

#[tokio::test]
async fn upload_progress_accounts_for_every_byte() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/uploadFile")
        .with_status(200)
        .with_body(r#"{"data":{"downloadPage":"https://gofile.io/d/abc123"}}"#)
        .create_async()
        .await;

    let size = 256 * 1024;
    let path = create_test_file("upload-progress.bin", size).await;

    let latest = Arc::new(AtomicU64::new(0));
    let seen = Arc::clone(&latest);
    let tracker = Arc::new(
        ProgressTracker::new(size as u64, Arc::new(move |sample: ProgressSample| {
            seen.store(sample.bytes_done, Ordering::SeqCst);
        }))
        .with_update_interval(Duration::ZERO),
    );

    let client = GofileClient::with_api_base(server.url());
    client
        .upload_to(
            &format!("{}/uploadFile", server.url()),
            &path,
            "demo.bin",
            Some(Arc::clone(&tracker)),
        )
        .await
        .unwrap();

    assert_eq!(tracker.bytes_done(), size as u64);
    assert_eq!(latest.load(Ordering::SeqCst), size as u64);
    cleanup_test_file(&path).await;
}
