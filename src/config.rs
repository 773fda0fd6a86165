//! Configuration management for the Helicone redirector
//!
//! Configuration is loaded from environment variables. The route table is
//! configuration data: every proxy and upstream base URL can be overridden.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;

use crate::credential::Credential;
use crate::error::RedirectResult;
use crate::provider::Provider;
use crate::route::RouteTable;

/// Provider API keys for the bundled clients
#[derive(Clone, Default)]
pub struct ProviderKeys {
    keys: HashMap<Provider, String>,
}

impl ProviderKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(mut self, provider: Provider, key: impl Into<String>) -> Self {
        self.keys.insert(provider, key.into());
        self
    }

    pub fn get(&self, provider: Provider) -> Option<&str> {
        self.keys.get(&provider).map(String::as_str)
    }
}

impl std::fmt::Debug for ProviderKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut configured: Vec<&str> = self.keys.keys().map(|p| p.as_str()).collect();
        configured.sort_unstable();
        f.debug_struct("ProviderKeys")
            .field("configured", &configured)
            .finish()
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Helicone API key; absence is reported on the first proxied request
    pub helicone_api_key: Option<Credential>,

    /// Per-provider Helicone endpoint overrides
    pub proxy_urls: HashMap<Provider, String>,
    /// Per-provider upstream API overrides
    pub api_base_urls: HashMap<Provider, String>,

    /// Provider API keys
    pub provider_keys: ProviderKeys,

    /// Overall timeout for one outbound request (in seconds)
    pub request_timeout_secs: u64,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut proxy_urls = HashMap::new();
        let mut api_base_urls = HashMap::new();
        let mut provider_keys = ProviderKeys::new();

        for provider in Provider::ALL {
            if let Some(url) = var(proxy_url_var(provider).as_str()) {
                proxy_urls.insert(provider, url);
            }
            if let Some(url) = var(api_base_url_var(provider).as_str()) {
                api_base_urls.insert(provider, url);
            }
            if let Some(key) = var(api_key_var(provider).as_str()) {
                provider_keys = provider_keys.with_key(provider, key);
            }
        }

        Ok(Self {
            helicone_api_key: var("HELICONE_API_KEY")
                .map(Credential::new)
                .transpose()
                .context("Invalid HELICONE_API_KEY")?,
            proxy_urls,
            api_base_urls,
            provider_keys,
            request_timeout_secs: var("HELICONE_REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| "300".to_string())
                .parse()
                .context("Invalid HELICONE_REQUEST_TIMEOUT_SECS")?,
            pool_max_idle_per_host: var("HELICONE_POOL_MAX_IDLE_PER_HOST")
                .unwrap_or_else(|| "100".to_string())
                .parse()
                .context("Invalid HELICONE_POOL_MAX_IDLE_PER_HOST")?,
        })
    }

    /// Build the route table, applying any overrides
    pub fn route_table(&self) -> RedirectResult<RouteTable> {
        let mut builder = RouteTable::builder();
        for (provider, url) in &self.proxy_urls {
            builder = builder.proxy_base(*provider, url.clone());
        }
        for (provider, url) in &self.api_base_urls {
            builder = builder.real_base(*provider, url.clone());
        }
        builder.build()
    }

    /// Helicone credential, `None` when not configured
    pub fn credential(&self) -> Option<Credential> {
        self.helicone_api_key.clone()
    }
}

/// `HELICONE_<PROVIDER>_PROXY_URL`
///
/// OpenAI, Anthropic and Groq overrides must be origins (`https://oai.helicone.ai`,
/// not `https://oai.helicone.ai/v1`): the request path is appended unchanged.
pub fn proxy_url_var(provider: Provider) -> String {
    format!("HELICONE_{}_PROXY_URL", provider.env_prefix())
}

/// `<PROVIDER>_API_BASE_URL`
pub fn api_base_url_var(provider: Provider) -> String {
    format!("{}_API_BASE_URL", provider.env_prefix())
}

/// Environment variable holding a provider's own API key
pub fn api_key_var(provider: Provider) -> String {
    match provider {
        Provider::Google => "GOOGLE_GENERATIVE_AI_API_KEY".to_string(),
        _ => format!("{}_API_KEY", provider.env_prefix()),
    }
}
