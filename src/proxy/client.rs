//! Provider clients
//!
//! Thin clients for each provider's native completion endpoint. They address
//! the provider's real API, exactly as an unmodified client would, and issue
//! every call through the [`Transport`] they were built with. When that
//! transport is a [`RedirectingTransport`](crate::proxy::RedirectingTransport)
//! the traffic lands on Helicone instead.

use std::sync::Arc;

use reqwest::header::{HeaderName, HeaderValue, AUTHORIZATION};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::error::{RedirectError, RedirectResult};
use crate::provider::Provider;
use crate::proxy::transport::{OutboundRequest, Transport};

/// Anthropic API version sent with every Messages request
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Completion client for one provider and model
#[derive(Clone)]
pub struct ProviderClient {
    provider: Provider,
    model: String,
    api_base: Url,
    api_key: Option<String>,
    transport: Arc<dyn Transport>,
}

impl ProviderClient {
    /// Create a client against `api_base`, the provider's real API
    ///
    /// The model identifier is passed through as given; the provider decides
    /// whether it exists.
    pub fn new(
        provider: Provider,
        model: impl Into<String>,
        api_base: Url,
        api_key: Option<String>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            provider,
            model: model.into(),
            api_base,
            api_key,
            transport,
        }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Completion endpoint on the provider's real API
    pub fn endpoint_url(&self) -> RedirectResult<Url> {
        let path = match self.provider {
            Provider::OpenAi => "/v1/chat/completions".to_string(),
            Provider::Anthropic => "/v1/messages".to_string(),
            Provider::Groq => "/openai/v1/chat/completions".to_string(),
            Provider::Google => format!("/v1beta/models/{}:generateContent", self.model),
        };
        self.url(&path)
    }

    /// Send a completion request and return the response untouched
    ///
    /// JSON object bodies for providers that address the model in the body
    /// get a `"model"` field when they don't already carry one.
    #[instrument(skip(self, body), fields(provider = %self.provider, model = %self.model))]
    pub async fn send_raw<T: Serialize + ?Sized>(&self, body: &T) -> RedirectResult<reqwest::Response> {
        let mut payload = serde_json::to_value(body)?;
        if self.provider != Provider::Google {
            if let Value::Object(map) = &mut payload {
                map.entry("model")
                    .or_insert_with(|| Value::String(self.model.clone()));
            }
        }

        let url = self.endpoint_url()?;
        self.send_json(Method::POST, url, Some(&payload)).await
    }

    /// Send a completion request and decode the JSON response
    ///
    /// Non-2xx responses become [`RedirectError::Upstream`] carrying the body.
    pub async fn complete<T, R>(&self, body: &T) -> RedirectResult<R>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let response = self.send_raw(body).await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            error!(
                provider = %self.provider,
                status = %status,
                body = %text,
                "Provider completion request failed"
            );
            return Err(RedirectError::Upstream { status, body: text });
        }

        Ok(response.json().await?)
    }

    /// Send an arbitrary request to a path on the provider's API
    pub async fn request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&T>,
    ) -> RedirectResult<reqwest::Response> {
        let url = self.url(path)?;
        self.send_json(method, url, body).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&T>,
    ) -> RedirectResult<reqwest::Response> {
        let mut request = OutboundRequest::new(method, url);
        for (name, value) in self.auth_headers()? {
            request = request.with_header(name, value);
        }
        if let Some(body) = body {
            request = request.with_json(body)?;
        }

        debug!(
            provider = %self.provider,
            url = %request.url,
            "Sending provider request"
        );

        self.transport.send(request).await
    }

    /// Provider-native authentication headers
    fn auth_headers(&self) -> RedirectResult<Vec<(HeaderName, HeaderValue)>> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(RedirectError::MissingProviderKey(self.provider))?;

        let secret = |raw: String| -> RedirectResult<HeaderValue> {
            let mut value = HeaderValue::from_str(&raw).map_err(|_| {
                RedirectError::Config(anyhow::anyhow!(
                    "API key for {} is not a valid header value",
                    self.provider
                ))
            })?;
            value.set_sensitive(true);
            Ok(value)
        };

        let headers = match self.provider {
            Provider::OpenAi | Provider::Groq => {
                vec![(AUTHORIZATION, secret(format!("Bearer {}", key))?)]
            }
            Provider::Anthropic => vec![
                (HeaderName::from_static("x-api-key"), secret(key.to_string())?),
                (
                    HeaderName::from_static("anthropic-version"),
                    HeaderValue::from_static(ANTHROPIC_VERSION),
                ),
            ],
            Provider::Google => vec![(
                HeaderName::from_static("x-goog-api-key"),
                secret(key.to_string())?,
            )],
        };

        Ok(headers)
    }

    fn url(&self, path: &str) -> RedirectResult<Url> {
        let raw = format!(
            "{}/{}",
            self.api_base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| RedirectError::InvalidUrl(format!("{}: {}", raw, e)))
    }
}

impl std::fmt::Debug for ProviderClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderClient")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base.as_str())
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
