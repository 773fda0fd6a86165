//! Request logging for redirected provider calls
//!
//! Structured logging with short correlation IDs so a single provider call can
//! be followed from rewrite to upstream response. The Helicone key is never
//! part of a log record, and neither is a URL's query string (Gemini clients
//! may pass `?key=` there).

use reqwest::Url;
use std::time::Instant;
use tracing::{debug, error, info, warn, Span};
use uuid::Uuid;

use crate::provider::Provider;
use crate::route::RewriteOutcome;

/// Context for tracking one outbound request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Unique identifier for this request (for log correlation)
    pub trace_id: String,
    /// When the request started
    pub start_time: Instant,
    /// Provider whose route handles this request
    pub provider: Provider,
    /// HTTP method
    pub method: String,
    /// Path of the original request
    pub path: String,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(provider: Provider, method: &str, path: &str) -> Self {
        Self {
            trace_id: Uuid::new_v4().to_string()[..8].to_string(), // Short ID for readability
            start_time: Instant::now(),
            provider,
            method: method.to_string(),
            path: path.to_string(),
        }
    }

    /// Get elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u128 {
        self.start_time.elapsed().as_millis()
    }

    /// Log the URL rewrite decision
    pub fn log_rewrite(&self, outcome: RewriteOutcome, url: &Url, header_count: usize) {
        match outcome {
            RewriteOutcome::Unmatched => warn!(
                trace_id = %self.trace_id,
                provider = %self.provider,
                url = %redacted_location(url),
                "Request host does not belong to provider route, sending unchanged"
            ),
            _ => debug!(
                trace_id = %self.trace_id,
                provider = %self.provider,
                outcome = outcome.as_str(),
                url = %redacted_location(url),
                header_count = %header_count,
                "Request redirected through Helicone"
            ),
        }
    }

    /// Log response received from upstream
    pub fn log_upstream_response(&self, status: u16, content_length: Option<u64>) {
        info!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            method = %self.method,
            path = %self.path,
            status = %status,
            content_length = ?content_length,
            elapsed_ms = %self.elapsed_ms(),
            "Response received from upstream"
        );
    }

    /// Log a transport failure (DNS, TLS, timeout, connection reset)
    pub fn log_transport_error(&self, error: &str, url: &Url) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            url = %redacted_location(url),
            elapsed_ms = %self.elapsed_ms(),
            error = %error,
            "Request to upstream failed"
        );
    }

    /// Log a request refused because no Helicone key is configured
    pub fn log_missing_credential(&self) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            path = %self.path,
            "HELICONE_API_KEY is not set, request not sent"
        );
    }

    /// Log a request refused because its host belongs to another provider
    pub fn log_routing_error(&self, error: &str) {
        error!(
            trace_id = %self.trace_id,
            provider = %self.provider,
            path = %self.path,
            error = %error,
            "Request addressed to another provider's host, not sent"
        );
    }

    /// Create a tracing span for this request
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "helicone_request",
            trace_id = %self.trace_id,
            provider = %self.provider,
            method = %self.method,
            path = %self.path,
        )
    }
}

/// Origin and path of `url`, without query string, fragment or userinfo
pub fn redacted_location(url: &Url) -> String {
    format!("{}{}", url.origin().ascii_serialization(), url.path())
}
