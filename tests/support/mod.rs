//! Shared helpers for integration tests: mock API server and client setup.

#![allow(dead_code)]

use std::time::Duration;

use conversiontools::{ClientBuilder, ConversionClient};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const FILE_ID: &str = "0123456789abcdef0123456789abcdef";
pub const RESULT_FILE_ID: &str = "fedcba9876543210fedcba9876543210";
pub const TASK_ID: &str = "aaaabbbbccccddddeeeeffff00001111";

/// Builder pointed at `server` with fast retries and polling.
pub fn builder_for(server: &MockServer) -> ClientBuilder {
    ConversionClient::builder(TOKEN)
        .base_url(format!("{}/v1", server.uri()))
        .retries(0)
        .retry_delay(Duration::from_millis(10))
        .polling_interval(Duration::from_millis(10))
        .max_polling_interval(Duration::from_millis(20))
}

pub fn client_for(server: &MockServer) -> ConversionClient {
    builder_for(server).build().expect("client should build")
}

pub fn status_body(
    status: &str,
    file_id: Option<&str>,
    error: Option<&str>,
    progress: u8,
) -> serde_json::Value {
    json!({
        "error": error,
        "status": status,
        "file_id": file_id,
        "conversionProgress": progress,
    })
}

/// Mounts `POST /v1/files` returning [`FILE_ID`].
pub async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "file_id": FILE_ID,
        })))
        .mount(server)
        .await;
}

/// Mounts `POST /v1/tasks` returning [`TASK_ID`].
pub async fn mount_create_task(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": null,
            "task_id": TASK_ID,
            "sandbox": false,
        })))
        .mount(server)
        .await;
}

/// Mounts a status sequence: `in_flight` RUNNING responses, then `last` forever.
pub async fn mount_status_sequence(server: &MockServer, in_flight: u64, last: serde_json::Value) {
    let task_path = format!("/v1/tasks/{TASK_ID}");
    if in_flight > 0 {
        Mock::given(method("GET"))
            .and(path(task_path.as_str()))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(status_body("RUNNING", None, None, 50)),
            )
            .up_to_n_times(in_flight)
            .mount(server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(task_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(last))
        .mount(server)
        .await;
}

/// Mounts `GET /v1/files/{RESULT_FILE_ID}` returning `content`.
pub async fn mount_result_download(server: &MockServer, content: &[u8], filename: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/files/{RESULT_FILE_ID}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "content-disposition",
                    format!("attachment; filename=\"{filename}\"").as_str(),
                )
                .set_body_bytes(content.to_vec()),
        )
        .mount(server)
        .await;
}
