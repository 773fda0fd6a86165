//! Failure handling tests
//!
//! Configuration problems stop a request before it leaves the process; proxy
//! rejections and network failures are passed back unchanged.

use reqwest::{Method, Url};
use serde_json::{json, Value};

use helicone_redirect::{
    Credential, OutboundRequest, Provider, ProviderKeys, RedirectError, Redirector, Transport,
};

use crate::common::{redirector_via, redirector_without_key, routes_via};
use crate::mocks::MockHelicone;

#[tokio::test]
async fn test_missing_helicone_key_fails_before_sending() {
    let helicone = MockHelicone::start().await;
    helicone.expect_no_requests().await;

    let client = redirector_without_key(&helicone.uri()).anthropic_with_helicone("claude-3-5-haiku");
    let result: Result<Value, _> = client
        .complete(&json!({ "max_tokens": 16, "messages": [] }))
        .await;

    let err = result.unwrap_err();
    assert!(matches!(err, RedirectError::MissingCredential));
    assert!(err.is_configuration());
}

#[tokio::test]
async fn test_missing_provider_key_fails_before_sending() {
    let helicone = MockHelicone::start().await;
    helicone.expect_no_requests().await;

    let redirector = Redirector::new_for_testing(
        routes_via(&helicone.uri()),
        Some(Credential::new("sk-helicone").unwrap()),
        ProviderKeys::new(),
    );
    let err = redirector
        .groq_with_helicone("llama3-8b")
        .send_raw(&json!({ "messages": [] }))
        .await
        .unwrap_err();

    assert!(matches!(err, RedirectError::MissingProviderKey(Provider::Groq)));
}

#[tokio::test]
async fn test_proxy_rejection_is_returned_as_response() {
    let helicone = MockHelicone::start().await;
    helicone.mock_invalid_helicone_key().await;

    let client = redirector_via(&helicone.uri()).openai_with_helicone("gpt-4o");
    let response = client
        .send_raw(&json!({ "messages": [] }))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid Helicone-Auth header");
}

#[tokio::test]
async fn test_proxy_rejection_surfaces_as_upstream_error_when_decoding() {
    let helicone = MockHelicone::start().await;
    helicone.mock_invalid_helicone_key().await;

    let client = redirector_via(&helicone.uri()).google_with_helicone("gemini-1.5-flash");
    let err = client
        .complete::<_, Value>(&json!({ "contents": [] }))
        .await
        .unwrap_err();

    match err {
        RedirectError::Upstream { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid Helicone-Auth header"));
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_connection_failure_is_propagated() {
    // Nothing listens on the discard port
    let client = redirector_via("http://127.0.0.1:9").openai_with_helicone("gpt-4o");
    let err = client
        .send_raw(&json!({ "messages": [] }))
        .await
        .unwrap_err();

    match err {
        RedirectError::Http(e) => assert!(e.is_connect() || e.is_request()),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_transport_error_drops_query_string() {
    let transport = redirector_via("http://127.0.0.1:9").transport(Provider::Google);
    let url = Url::parse(
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=AIza-secret",
    )
    .unwrap();

    let err = transport
        .send(OutboundRequest::new(Method::POST, url).with_body("{}"))
        .await
        .unwrap_err();

    match err {
        RedirectError::Http(e) => {
            assert!(e.url().is_some_and(|url| url.query().is_none()));
            assert!(!e.to_string().contains("AIza-secret"));
        }
        other => panic!("expected transport error, got {:?}", other),
    }
}
