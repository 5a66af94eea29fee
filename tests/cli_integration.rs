//! CLI integration tests
//!
//! One-shot mode runs as a child process against wiremock upstreams and must
//! keep stdout pure JSON.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use common::{MockServerFactory, TEST_KEY_HEX, VIDEO_ID};
use predicates::prelude::*;
use std::io::Write;
use tempfile::NamedTempFile;
use wiremock::MockServer;

/// Config file pointing every upstream at `server`
fn config_for(server: &MockServer) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    writeln!(
        temp_file,
        r#"
[logging]
level = "debug"

[network]
request_timeout = 5

[cdn]
hosts = ["{uri}"]
decryption_key = "{key}"

[search]
innertube_base_url = "{uri}"
web_base_url = "{uri}"

[direct]
enabled = false

[pipeline]
attribution = "cli-test"
        "#,
        uri = server.uri(),
        key = TEST_KEY_HEX
    )
    .unwrap();
    temp_file.flush().unwrap();
    temp_file
}

async fn run(args: Vec<String>) -> std::process::Output {
    tokio::task::spawn_blocking(move || {
        let mut cmd = cargo_bin_cmd!("ytdl-gateway");
        cmd.env_remove("RUST_LOG");
        cmd.env_remove("CDN_DECRYPTION_KEY");
        cmd.args(&args);
        cmd.timeout(std::time::Duration::from_secs(20));
        cmd.output().unwrap()
    })
    .await
    .unwrap()
}

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("ytdl-gateway");
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_flag() {
    let mut cmd = cargo_bin_cmd!("ytdl-gateway");
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--query"))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("server"));
}

#[test]
fn test_server_config_flag_with_help() {
    let mut cmd = cargo_bin_cmd!("ytdl-gateway");
    cmd.args(["server", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_missing_target_is_usage_error() {
    let mut cmd = cargo_bin_cmd!("ytdl-gateway");
    cmd.env_remove("RUST_LOG");

    let output = cmd.output().unwrap();
    assert_eq!(output.status.code(), Some(2));

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert!(json["example"].is_string());
}

#[tokio::test]
async fn test_one_shot_query_prints_resolution() {
    let server = MockServerFactory::new().await;
    MockServerFactory::setup_happy_path(&server).await;
    let config = config_for(&server);

    let output = run(vec![
        "--query".to_string(),
        "barota".to_string(),
        "--config".to_string(),
        config.path().to_str().unwrap().to_string(),
    ])
    .await;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["videoId"], VIDEO_ID);
    assert_eq!(json["highestVideo"]["quality"], 720);
    assert_eq!(json["developer"], "cli-test");
}

#[tokio::test]
async fn test_one_shot_failure_exits_non_zero() {
    let server = MockServerFactory::new().await;
    MockServerFactory::setup_empty_search(&server).await;
    let config = config_for(&server);

    let output = run(vec![
        "--query".to_string(),
        "zzzz".to_string(),
        "--config".to_string(),
        config.path().to_str().unwrap().to_string(),
    ])
    .await;

    assert_eq!(output.status.code(), Some(1));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["category"], "not_found");
    assert_eq!(json["query"], "zzzz");
}

#[tokio::test]
async fn test_one_shot_url_skips_search() {
    let server = MockServerFactory::new().await;
    MockServerFactory::setup_happy_path(&server).await;
    let config = config_for(&server);

    let output = run(vec![
        "--url".to_string(),
        format!("https://www.youtube.com/watch?v={}", VIDEO_ID),
        "--config".to_string(),
        config.path().to_str().unwrap().to_string(),
    ])
    .await;

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(json.get("query").is_none());
    assert_eq!(json["videoId"], VIDEO_ID);
}
