//! Common test utilities for integration tests.
//!
//! Helpers for pointing a [`RagflowClient`] at a wiremock server and building
//! server-sent completion bodies.

#![allow(dead_code)]

use ragflow::{ClientConfig, RagflowClient};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// API key used by every test client.
pub const TEST_API_KEY: &str = "ragflow-test-key";

/// Chat assistant ID used across tests.
pub const TEST_CHAT_ID: &str = "chat-123";

/// Creates a client pointed at the mock server with the test API key.
pub fn client_for(server: &MockServer) -> RagflowClient {
    RagflowClient::new(ClientConfig::new(server.uri()).with_api_key(TEST_API_KEY))
        .expect("test config is valid")
}

/// Value of the `Authorization` header the client should send.
pub fn bearer() -> String {
    format!("Bearer {}", TEST_API_KEY)
}

/// Builds an event-stream body from raw payloads, one `data:` line per payload.
pub fn sse_body(payloads: &[&str]) -> String {
    payloads
        .iter()
        .map(|payload| format!("data:{}\n\n", payload))
        .collect()
}

/// Payload of an answer frame carrying the cumulative answer.
pub fn answer_frame(answer: &str) -> String {
    serde_json::json!({
        "code": 0,
        "message": "",
        "data": {
            "answer": answer,
            "reference": {},
            "id": "msg-1",
            "session_id": "sess-1"
        }
    })
    .to_string()
}

/// Payload of the completion frame.
pub fn done_frame() -> String {
    r#"{"code":0,"message":"","data":true}"#.to_string()
}

/// Mounts a completion endpoint answering with `body` as `text/event-stream`.
pub async fn mount_completion(server: &MockServer, chat_id: &str, body: String) {
    Mock::given(method("POST"))
        .and(path(format!("/api/v1/chats/{}/completions", chat_id)))
        .and(header("Authorization", bearer().as_str()))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"),
        )
        .mount(server)
        .await;
}
