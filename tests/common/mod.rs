// tests/common/mod.rs
//! Shared fixtures for end-to-end tests.

use std::time::Duration;

use httpmock::Method::POST;
use httpmock::{Mock, MockServer};

use codeforge_lib::config::AppConfig;
use codeforge_lib::model::OpenAiCompatClient;
use codeforge_lib::AppState;

/// Mock an OpenAI-compatible `/chat/completions` endpoint that always answers
/// with `reply`.
pub fn mock_chat_reply<'a>(server: &'a MockServer, reply: &str) -> Mock<'a> {
    server.mock(|when, then| {
        when.method(POST).path("/v1/chat/completions");
        then.status(200).json_body(serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        }));
    })
}

pub fn client_for(server: &MockServer) -> OpenAiCompatClient {
    OpenAiCompatClient::new(
        "test-key".to_string(),
        "gpt-test".to_string(),
        server.url("/v1"),
        Duration::from_secs(5),
    )
    .expect("client should build")
}

pub fn fresh_state() -> AppState {
    AppState::new(AppConfig::default())
}
