//! Transport override for provider clients
//!
//! A provider client never talks to reqwest directly. It is handed a
//! [`Transport`] at construction time, and the redirector hands it a
//! [`RedirectingTransport`] bound to that provider's route. Every request the
//! client issues therefore passes through the rewrite step; nothing is patched
//! process-wide.

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde::Serialize;
use tracing::Instrument;

use crate::credential::Credential;
use crate::error::{RedirectError, RedirectResult};
use crate::provider::Provider;
use crate::proxy::headers::inject_proxy_headers;
use crate::proxy::logging::{redacted_location, RequestContext};
use crate::route::{ProviderRoute, RewriteOutcome, RouteTable};

/// One outbound HTTP call, before it leaves the process
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl OutboundRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Add a header, keeping any existing values for the same name
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Serialize `body` as JSON and set `Content-Type: application/json`
    pub fn with_json<T: Serialize + ?Sized>(mut self, body: &T) -> RedirectResult<Self> {
        let bytes = serde_json::to_vec(body)?;
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(Bytes::from(bytes));
        Ok(self)
    }

    /// Build the reqwest request with the caller's headers as they are
    fn into_reqwest(self, client: &reqwest::Client) -> RedirectResult<reqwest::Request> {
        let mut builder = client.request(self.method, self.url).headers(self.headers);

        if let Some(body) = self.body {
            builder = builder.body(body);
        }

        Ok(builder.build()?)
    }
}

/// An [`OutboundRequest`] after a route has been applied to it
#[derive(Debug, Clone)]
pub struct RewrittenRequest {
    pub request: OutboundRequest,
    pub outcome: RewriteOutcome,
}

/// Sends outbound requests
///
/// Implementations must hand back the response exactly as received: status
/// codes are not interpreted and transport errors are not masked.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> RedirectResult<reqwest::Response>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: OutboundRequest) -> RedirectResult<reqwest::Response> {
        (**self).send(request).await
    }
}

/// Plain reqwest transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: OutboundRequest) -> RedirectResult<reqwest::Response> {
        let request = request.into_reqwest(&self.client)?;
        Ok(self.client.execute(request).await?)
    }
}

/// Transport bound to one provider route
///
/// Rewrites the URL, adds the Helicone headers, then delegates to `inner`.
/// Requests for hosts outside every route are forwarded untouched and never
/// see the Helicone key. Requests for another provider's host are refused.
#[derive(Debug, Clone)]
pub struct RedirectingTransport<T = HttpTransport> {
    inner: T,
    routes: Arc<RouteTable>,
    provider: Provider,
    credential: Option<Credential>,
}

impl<T: Transport> RedirectingTransport<T> {
    pub fn new(
        inner: T,
        routes: Arc<RouteTable>,
        provider: Provider,
        credential: Option<Credential>,
    ) -> Self {
        Self {
            inner,
            routes,
            provider,
            credential,
        }
    }

    pub fn route(&self) -> &ProviderRoute {
        self.routes.route(self.provider)
    }

    /// Apply the route to `request` without sending it
    ///
    /// The input is left untouched so the caller can still inspect or resend
    /// it. Fails with [`RedirectError::MissingCredential`] when the request
    /// would reach the proxy and no Helicone key is configured, and with
    /// [`RedirectError::ForeignProviderHost`] when the URL belongs to a
    /// different provider's route.
    pub fn prepare(&self, request: &OutboundRequest) -> RedirectResult<RewrittenRequest> {
        let route = self.route();
        let rewrite = route.rewrite_url(&request.url);

        let headers = if rewrite.outcome.targets_proxy() {
            let credential = self
                .credential
                .as_ref()
                .ok_or(RedirectError::MissingCredential)?;
            inject_proxy_headers(
                &request.headers,
                credential,
                route.target_header_for(rewrite.outcome),
            )
        } else {
            if let Some(owner) = self.routes.route_for_url(&request.url) {
                return Err(RedirectError::ForeignProviderHost {
                    provider: self.provider,
                    owner: owner.provider(),
                    url: redacted_location(&request.url),
                });
            }
            request.headers.clone()
        };

        Ok(RewrittenRequest {
            request: OutboundRequest {
                method: request.method.clone(),
                url: rewrite.url,
                headers,
                body: request.body.clone(),
            },
            outcome: rewrite.outcome,
        })
    }
}

#[async_trait]
impl<T: Transport> Transport for RedirectingTransport<T> {
    async fn send(&self, request: OutboundRequest) -> RedirectResult<reqwest::Response> {
        let provider = self.provider;
        let ctx = RequestContext::new(provider, request.method.as_str(), request.url.path());
        let span = ctx.create_span();

        let rewritten = match self.prepare(&request) {
            Ok(rewritten) => rewritten,
            Err(e) => {
                match &e {
                    RedirectError::MissingCredential => ctx.log_missing_credential(),
                    RedirectError::ForeignProviderHost { .. } => ctx.log_routing_error(&e.to_string()),
                    _ => {}
                }
                return Err(e);
            }
        };

        let url = rewritten.request.url.clone();
        ctx.log_rewrite(rewritten.outcome, &url, rewritten.request.headers.len());
        metrics::counter!(
            "helicone_redirect_requests_total",
            "provider" => provider.as_str(),
            "outcome" => rewritten.outcome.as_str()
        )
        .increment(1);

        match self.inner.send(rewritten.request).instrument(span).await {
            Ok(response) => {
                ctx.log_upstream_response(response.status().as_u16(), response.content_length());
                Ok(response)
            }
            Err(mut e) => {
                // reqwest errors carry the request URL in their message
                if let RedirectError::Http(http) = &mut e {
                    if let Some(url) = http.url_mut() {
                        url.set_query(None);
                    }
                }
                ctx.log_transport_error(&e.to_string(), &url);
                Err(e)
            }
        }
    }
}
