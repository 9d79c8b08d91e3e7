//! End-to-end CLI tests for the conversiontools binary.

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use support::{FILE_ID, RESULT_FILE_ID, TASK_ID, TOKEN, mount_result_download, status_body};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN_ENV: &str = "CONVERSIONTOOLS_API_TOKEN";
const BASE_URL_ENV: &str = "CONVERSIONTOOLS_BASE_URL";

/// Binary with the token and base URL variables cleared.
fn bin() -> Command {
    let mut cmd = Command::cargo_bin("conversiontools").unwrap();
    cmd.env_remove(TOKEN_ENV).env_remove(BASE_URL_ENV);
    cmd
}

/// Binary pointed at a mock server.
fn bin_for(server: &MockServer) -> Command {
    let mut cmd = bin();
    cmd.env(TOKEN_ENV, TOKEN)
        .env(BASE_URL_ENV, format!("{}/v1", server.uri()))
        .arg("--retries")
        .arg("0");
    cmd
}

async fn run_blocking(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[test]
fn test_help_displays_usage() {
    bin()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Conversion Tools API"))
        .stdout(predicate::str::contains("convert"));
}

#[test]
fn test_version_displays_version() {
    bin()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("conversiontools"));
}

#[test]
fn test_invalid_flag_returns_error() {
    bin()
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_types_lists_catalog_without_token() {
    bin()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("convert.xml_to_csv"))
        .stdout(predicate::str::contains("convert.website_to_pdf"));
}

#[test]
fn test_types_shows_options_of_one_type() {
    bin()
        .args(["types", "convert.xml_to_csv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("delimiter"));
}

#[test]
fn test_types_unknown_type_fails() {
    bin()
        .args(["types", "convert.nothing_to_nowhere"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not in the built-in catalog"));
}

#[test]
fn test_missing_token_fails() {
    bin()
        .arg("user")
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing API token"));
}

#[test]
fn test_retries_out_of_range_rejected() {
    bin()
        .args(["--retries", "11", "user"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("retries"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_user_prints_email_and_limits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-ratelimit-limit-tasks", "30")
                .insert_header("x-ratelimit-limit-tasks-remaining", "29")
                .set_body_json(json!({"error": null, "email": "user@example.com"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = bin_for(&server);
    cmd.arg("user");
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("email = user@example.com"))
        .stdout(predicate::str::contains("daily = 29/30 remaining"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_status_prints_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/tasks/{TASK_ID}").as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(status_body(
                "SUCCESS",
                Some(RESULT_FILE_ID),
                None,
                100,
            )),
        )
        .mount(&server)
        .await;

    let mut cmd = bin_for(&server);
    cmd.args(["status", TASK_ID, "--json"]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("\"status\": \"SUCCESS\""))
        .stdout(predicate::str::contains(RESULT_FILE_ID));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_download_uses_content_disposition_name() {
    let server = MockServer::start().await;
    mount_result_download(&server, b"col\nvalue\n", "report.csv").await;
    let temp = TempDir::new().unwrap();

    let mut cmd = bin_for(&server);
    cmd.current_dir(temp.path())
        .args(["-q", "download", RESULT_FILE_ID]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("report.csv"));

    assert_eq!(
        std::fs::read(temp.path().join("report.csv")).unwrap(),
        b"col\nvalue\n"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_convert_no_wait_prints_task_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": TASK_ID})))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = bin_for(&server);
    cmd.args([
        "-q",
        "convert",
        "convert.xml_to_csv",
        FILE_ID,
        "--file-id",
        "-O",
        "delimiter=comma",
        "--no-wait",
    ]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains(TASK_ID));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_authentication_error_exits_non_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "Invalid token"})))
        .mount(&server)
        .await;

    let mut cmd = bin_for(&server);
    cmd.arg("user");
    run_blocking(cmd)
        .await
        .failure()
        .stderr(predicate::str::contains("Invalid token"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_remote_types_lists_server_conversions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "conversions": [
                {"type": "convert.xml_to_csv", "title": "XML to CSV", "options": ["delimiter"]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut cmd = bin_for(&server);
    cmd.args(["types", "--remote"]);
    run_blocking(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("convert.xml_to_csv"))
        .stdout(predicate::str::contains("XML to CSV"));
}
