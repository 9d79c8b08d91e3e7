//! v1-compatible client tests against a mock API.

mod support;

use std::time::Duration;

use conversiontools::{ApiError, LegacyClient, LegacyRunOptions};
use serde_json::json;
use support::{
    RESULT_FILE_ID, TASK_ID, client_for, mount_create_task, mount_result_download,
    mount_status_sequence, status_body,
};
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_run_translates_v1_options() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/tasks"))
        .and(body_partial_json(json!({
            "type": "convert.website_to_pdf",
            "options": {
                "url": "https://example.com",
                "images": true,
                "javascript": false,
                "delimiter": "tabulation"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": TASK_ID})))
        .expect(1)
        .mount(&server)
        .await;
    mount_status_sequence(
        &server,
        1,
        status_body("SUCCESS", Some(RESULT_FILE_ID), None, 100),
    )
    .await;
    mount_result_download(&server, b"%PDF", "site.pdf").await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("site.pdf");
    let options = json!({"images": "yes", "javascript": "no", "delimiter": "tab"});

    let legacy = LegacyClient::from_client(client_for(&server));
    let path = legacy
        .run(
            "convert.website_to_pdf",
            LegacyRunOptions {
                url: Some("https://example.com".into()),
                output_filename: Some(output.clone()),
                timeout: Some(Duration::from_millis(10)),
                options: options.as_object().unwrap().clone(),
                ..LegacyRunOptions::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(path, output);
    assert_eq!(std::fs::read(&output).unwrap(), b"%PDF");
}

#[tokio::test]
async fn test_run_requires_filename_or_url() {
    let server = MockServer::start().await;
    let legacy = LegacyClient::from_client(client_for(&server));

    let error = legacy
        .run("convert.xml_to_csv", LegacyRunOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(error, ApiError::Validation { .. }));
    assert_eq!(error.message(), "Either filename or url must be provided");
}

#[tokio::test]
async fn test_check_status_waits_then_downloads() {
    let server = MockServer::start().await;
    mount_create_task(&server).await;
    mount_status_sequence(
        &server,
        2,
        status_body("SUCCESS", Some(RESULT_FILE_ID), None, 100),
    )
    .await;
    mount_result_download(&server, b"done", "done.csv").await;

    let temp = TempDir::new().unwrap();
    let output = temp.path().join("done.csv");
    let legacy = LegacyClient::from_client(client_for(&server));

    let path = legacy
        .check_status(TASK_ID, Some(&output), Some(Duration::from_millis(10)))
        .await
        .unwrap();

    assert_eq!(path, output);
    assert_eq!(std::fs::read(&output).unwrap(), b"done");
}

#[tokio::test]
async fn test_check_status_reports_failed_task() {
    let server = MockServer::start().await;
    mount_status_sequence(&server, 0, status_body("ERROR", None, Some("Bad input"), 0)).await;

    let legacy = LegacyClient::from_client(client_for(&server));
    let error = legacy.check_status(TASK_ID, None, None).await.unwrap_err();

    assert_eq!(error.code(), "CONVERSION_ERROR");
    assert_eq!(error.message(), "Bad input");
}
