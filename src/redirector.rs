//! Per-provider client factories
//!
//! A [`Redirector`] owns the route table, the Helicone credential and one
//! pooled reqwest client. Each factory builds a [`ProviderClient`] whose
//! transport is bound to that provider's route at construction time.

use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use reqwest::Url;
use tracing::info;

use crate::config::{Config, ProviderKeys};
use crate::credential::Credential;
use crate::error::RedirectResult;
use crate::provider::Provider;
use crate::proxy::{HttpTransport, ProviderClient, RedirectingTransport};
use crate::route::RouteTable;

/// Shared context for building Helicone-routed clients
#[derive(Debug, Clone)]
pub struct Redirector {
    routes: Arc<RouteTable>,
    credential: Option<Credential>,
    http: HttpTransport,
    provider_keys: ProviderKeys,
}

impl Redirector {
    /// Create a redirector from configuration
    pub fn new(config: &Config) -> RedirectResult<Self> {
        let routes = config.route_table()?;

        // Initialize HTTP client with connection pooling
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        if config.helicone_api_key.is_none() {
            tracing::warn!("HELICONE_API_KEY is not set; proxied requests will fail");
        }
        info!(
            providers = Provider::ALL.len(),
            "Helicone routes initialized"
        );

        Ok(Self::from_parts(
            routes,
            config.credential(),
            config.provider_keys.clone(),
            client,
        ))
    }

    /// Assemble a redirector from already-built parts
    pub fn from_parts(
        routes: RouteTable,
        credential: Option<Credential>,
        provider_keys: ProviderKeys,
        client: reqwest::Client,
    ) -> Self {
        Self {
            routes: Arc::new(routes),
            credential,
            http: HttpTransport::new(client),
            provider_keys,
        }
    }

    /// Create a redirector for testing with a plain reqwest client
    #[cfg(any(test, feature = "test-utils"))]
    pub fn new_for_testing(
        routes: RouteTable,
        credential: Option<Credential>,
        provider_keys: ProviderKeys,
    ) -> Self {
        Self::from_parts(routes, credential, provider_keys, reqwest::Client::new())
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Transport bound to a provider's route, for callers with their own client
    pub fn transport(&self, provider: Provider) -> RedirectingTransport<HttpTransport> {
        RedirectingTransport::new(
            self.http.clone(),
            self.routes.clone(),
            provider,
            self.credential.clone(),
        )
    }

    /// Client for `provider` and `model`, routed through Helicone
    pub fn client(&self, provider: Provider, model: impl Into<String>) -> ProviderClient {
        let api_base: Url = self.routes.route(provider).real_base().clone();
        ProviderClient::new(
            provider,
            model,
            api_base,
            self.provider_keys.get(provider).map(str::to_string),
            Arc::new(self.transport(provider)),
        )
    }

    /// Client for a provider identifier such as `"anthropic"`
    pub fn client_for(&self, provider: &str, model: impl Into<String>) -> RedirectResult<ProviderClient> {
        Ok(self.client(provider.parse()?, model))
    }

    pub fn openai_with_helicone(&self, model: impl Into<String>) -> ProviderClient {
        self.client(Provider::OpenAi, model)
    }

    pub fn anthropic_with_helicone(&self, model: impl Into<String>) -> ProviderClient {
        self.client(Provider::Anthropic, model)
    }

    pub fn groq_with_helicone(&self, model: impl Into<String>) -> ProviderClient {
        self.client(Provider::Groq, model)
    }

    pub fn google_with_helicone(&self, model: impl Into<String>) -> ProviderClient {
        self.client(Provider::Google, model)
    }
}

static GLOBAL: OnceCell<Redirector> = OnceCell::new();

/// Process-wide redirector built once from the environment
///
/// Read-only after initialization. Failed initialization is not cached, so a
/// corrected environment is picked up on the next call.
pub fn global() -> RedirectResult<&'static Redirector> {
    GLOBAL.get_or_try_init(|| Redirector::new(&Config::from_env()?))
}

/// OpenAI client routed through Helicone, using the process-wide redirector
pub fn openai_with_helicone(model: impl Into<String>) -> RedirectResult<ProviderClient> {
    Ok(global()?.openai_with_helicone(model))
}

/// Anthropic client routed through Helicone, using the process-wide redirector
pub fn anthropic_with_helicone(model: impl Into<String>) -> RedirectResult<ProviderClient> {
    Ok(global()?.anthropic_with_helicone(model))
}

/// Groq client routed through Helicone, using the process-wide redirector
pub fn groq_with_helicone(model: impl Into<String>) -> RedirectResult<ProviderClient> {
    Ok(global()?.groq_with_helicone(model))
}

/// Google client routed through Helicone, using the process-wide redirector
pub fn google_with_helicone(model: impl Into<String>) -> RedirectResult<ProviderClient> {
    Ok(global()?.google_with_helicone(model))
}
