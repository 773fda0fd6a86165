//! Mock Helicone proxy for testing
//!
//! Provides wiremock-based mocks standing in for the Helicone endpoints:
//! - POST /v1/chat/completions - OpenAI-compatible completions (oai proxy)
//! - POST /openai/v1/chat/completions - Groq completions (groq proxy)
//! - POST /v1/messages - Anthropic messages (anthropic proxy)
//! - POST /v1beta/models/{model}:generateContent - Gemini (shared gateway)
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::mocks::helicone::{MockHelicone, HeliconeTestData};
//!
//! #[tokio::test]
//! async fn test_with_helicone_mock() {
//!     let helicone = MockHelicone::start().await;
//!     helicone.mock_openai_completion(HeliconeTestData::openai_response("hi")).await;
//!     // Point the route table's proxy bases at helicone.uri()
//! }
//! ```

use serde_json::{json, Value};
use wiremock::{
    matchers::{header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use crate::common::constants::{TEST_HELICONE_KEY, TEST_PROVIDER_KEY};

/// Mock Helicone server wrapper
pub struct MockHelicone {
    server: MockServer,
}

impl MockHelicone {
    /// Start a new mock Helicone server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the mock server URI
    pub fn uri(&self) -> String {
        self.server.uri()
    }

    /// Access the underlying server for custom mocks and request inspection
    pub fn server(&self) -> &MockServer {
        &self.server
    }

    /// Expected `Helicone-Auth` value
    pub fn auth_value() -> String {
        format!("Bearer {}", TEST_HELICONE_KEY)
    }

    /// OpenAI completion through the dedicated proxy
    pub async fn mock_openai_completion(&self, response: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("Helicone-Auth", Self::auth_value().as_str()))
            .and(header("Authorization", format!("Bearer {}", TEST_PROVIDER_KEY).as_str()))
            .and(header("Content-Type", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Groq completion through the dedicated proxy
    pub async fn mock_groq_completion(&self, response: Value) {
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("Helicone-Auth", Self::auth_value().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Anthropic messages call through the dedicated proxy
    pub async fn mock_anthropic_message(&self, response: Value) {
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("Helicone-Auth", Self::auth_value().as_str()))
            .and(header("x-api-key", TEST_PROVIDER_KEY))
            .and(header("anthropic-version", "2023-06-01"))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Gemini call through the shared gateway, addressed by target header
    pub async fn mock_gemini_generate(&self, model: &str, target: &str, response: Value) {
        Mock::given(method("POST"))
            .and(path(format!("/v1beta/models/{}:generateContent", model)))
            .and(header("Helicone-Auth", Self::auth_value().as_str()))
            .and(header("Helicone-Target-URL", target))
            .and(header("x-goog-api-key", TEST_PROVIDER_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Helicone rejecting the key, for any request
    pub async fn mock_invalid_helicone_key(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": "Invalid Helicone-Auth header"
            })))
            .mount(&self.server)
            .await;
    }

    /// Fail the test if anything reaches this server
    pub async fn expect_no_requests(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&self.server)
            .await;
    }

    /// Accept anything with 200, for traffic that should not be redirected
    pub async fn mock_catch_all(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .mount(&self.server)
            .await;
    }
}

/// Canned provider responses
pub struct HeliconeTestData;

impl HeliconeTestData {
    pub fn openai_response(content: &str) -> Value {
        json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 5, "completion_tokens": 2, "total_tokens": 7 }
        })
    }

    pub fn anthropic_response(text: &str) -> Value {
        json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": "claude-3-7-sonnet-latest",
            "content": [{ "type": "text", "text": text }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 5, "output_tokens": 2 }
        })
    }

    pub fn gemini_response(text: &str) -> Value {
        json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": text }] },
                "finishReason": "STOP"
            }]
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let helicone = MockHelicone::start().await;
        assert!(helicone.uri().starts_with("http://"));
    }

    #[tokio::test]
    async fn test_invalid_key_mock_returns_401() {
        let helicone = MockHelicone::start().await;
        helicone.mock_invalid_helicone_key().await;

        let response = reqwest::Client::new()
            .post(format!("{}/v1/chat/completions", helicone.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 401);
    }
}
