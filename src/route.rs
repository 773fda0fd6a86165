//! Provider route table and URL rewrite rules
//!
//! Each provider owns one immutable [`ProviderRoute`] describing where its real
//! API lives and which Helicone endpoint should receive its traffic instead.
//! Rewriting is a pure function of the route and the outbound URL.

use reqwest::header::HeaderValue;
use reqwest::Url;

use crate::error::{RedirectError, RedirectResult};
use crate::provider::Provider;

/// Dedicated Helicone proxy for OpenAI
pub const OPENAI_PROXY_URL: &str = "https://oai.helicone.ai";
/// Dedicated Helicone proxy for Anthropic
pub const ANTHROPIC_PROXY_URL: &str = "https://anthropic.helicone.ai";
/// Dedicated Helicone proxy for Groq
pub const GROQ_PROXY_URL: &str = "https://groq.helicone.ai";
/// Shared Helicone gateway that re-dispatches on `Helicone-Target-URL`
pub const GATEWAY_PROXY_URL: &str = "https://gateway.helicone.ai";

/// How a route maps a real provider URL onto the proxy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteStrategy {
    /// Swap the scheme and host for the proxy's, keep path and query
    HostSubstitution,
    /// Send path and query to a shared gateway and name the real upstream in
    /// a header
    PathForwarding,
}

impl RewriteStrategy {
    /// Strategy used by a provider's Helicone integration
    pub fn for_provider(provider: Provider) -> Self {
        match provider {
            Provider::Google => RewriteStrategy::PathForwarding,
            _ => RewriteStrategy::HostSubstitution,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteStrategy::HostSubstitution => "host_substitution",
            RewriteStrategy::PathForwarding => "path_forwarding",
        }
    }
}

/// What a rewrite did to a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// The URL pointed at the real provider and now points at the proxy
    Rewritten,
    /// The URL already pointed at the proxy and was left alone
    AlreadyProxied,
    /// The URL matched neither host and was left alone
    Unmatched,
}

impl RewriteOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            RewriteOutcome::Rewritten => "rewritten",
            RewriteOutcome::AlreadyProxied => "already_proxied",
            RewriteOutcome::Unmatched => "unmatched",
        }
    }

    /// Whether the resulting URL is addressed to the proxy
    pub fn targets_proxy(&self) -> bool {
        !matches!(self, RewriteOutcome::Unmatched)
    }
}

/// Result of applying a route to a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub url: Url,
    pub outcome: RewriteOutcome,
}

/// Immutable routing rule for one provider
#[derive(Debug, Clone)]
pub struct ProviderRoute {
    provider: Provider,
    real_base: Url,
    proxy_base: Url,
    strategy: RewriteStrategy,
    target_url: Option<HeaderValue>,
}

impl ProviderRoute {
    /// Build a route using the provider's standard strategy
    pub fn new(provider: Provider, real_base: &str, proxy_base: &str) -> RedirectResult<Self> {
        Self::with_strategy(
            provider,
            real_base,
            proxy_base,
            RewriteStrategy::for_provider(provider),
        )
    }

    /// Build a route with an explicit strategy
    pub fn with_strategy(
        provider: Provider,
        real_base: &str,
        proxy_base: &str,
        strategy: RewriteStrategy,
    ) -> RedirectResult<Self> {
        let real_base = parse_base(real_base)?;
        let proxy_base = parse_base(proxy_base)?;

        let target_url = match strategy {
            RewriteStrategy::HostSubstitution => {
                // The request path is kept as is, so a prefix here would be doubled
                if !proxy_base.path().trim_end_matches('/').is_empty() {
                    return Err(RedirectError::InvalidUrl(format!(
                        "{}: {} proxy base must be an origin without a path",
                        proxy_base, provider
                    )));
                }
                None
            }
            RewriteStrategy::PathForwarding => {
                let value = real_base.as_str().trim_end_matches('/');
                Some(HeaderValue::from_str(value).map_err(|_| {
                    RedirectError::InvalidUrl(format!("{} is not a valid header value", value))
                })?)
            }
        };

        Ok(Self {
            provider,
            real_base,
            proxy_base,
            strategy,
            target_url,
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn real_base(&self) -> &Url {
        &self.real_base
    }

    pub fn proxy_base(&self) -> &Url {
        &self.proxy_base
    }

    pub fn strategy(&self) -> RewriteStrategy {
        self.strategy
    }

    /// Value for `Helicone-Target-URL`; only path-forwarding routes have one
    pub fn target_url(&self) -> Option<&HeaderValue> {
        self.target_url.as_ref()
    }

    /// Target header to attach for a request with the given rewrite outcome
    pub fn target_header_for(&self, outcome: RewriteOutcome) -> Option<&HeaderValue> {
        if outcome.targets_proxy() {
            self.target_url.as_ref()
        } else {
            None
        }
    }

    /// Rewrite an absolute URL for this route
    ///
    /// URLs already on the proxy and URLs for unrelated hosts come back
    /// unchanged, so applying the rewrite twice is the same as applying it once.
    pub fn rewrite_url(&self, url: &Url) -> Rewrite {
        if strip_base(url, &self.proxy_base).is_some() {
            return Rewrite {
                url: url.clone(),
                outcome: RewriteOutcome::AlreadyProxied,
            };
        }

        match strip_base(url, &self.real_base) {
            Some(rest) => Rewrite {
                url: rebase(url, rest, &self.proxy_base),
                outcome: RewriteOutcome::Rewritten,
            },
            None => Rewrite {
                url: url.clone(),
                outcome: RewriteOutcome::Unmatched,
            },
        }
    }

    /// Whether the URL belongs to this route's real or proxy host
    pub fn owns(&self, url: &Url) -> bool {
        strip_base(url, &self.real_base).is_some() || strip_base(url, &self.proxy_base).is_some()
    }
}

/// The four provider routes
#[derive(Debug, Clone)]
pub struct RouteTable {
    openai: ProviderRoute,
    anthropic: ProviderRoute,
    groq: ProviderRoute,
    google: ProviderRoute,
}

impl RouteTable {
    /// Start from the default Helicone routes
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::default()
    }

    /// Route for a provider
    pub fn route(&self, provider: Provider) -> &ProviderRoute {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Groq => &self.groq,
            Provider::Google => &self.google,
        }
    }

    /// Route for a provider identifier such as `"openai"`
    pub fn route_for(&self, provider: &str) -> RedirectResult<&ProviderRoute> {
        Ok(self.route(provider.parse()?))
    }

    /// Route whose real or proxy host serves this URL, if any
    pub fn route_for_url(&self, url: &Url) -> Option<&ProviderRoute> {
        self.iter().find(|route| route.owns(url))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProviderRoute> {
        Provider::ALL.into_iter().map(move |provider| self.route(provider))
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        RouteTable::builder()
            .build()
            .expect("default Helicone routes are valid URLs")
    }
}

/// Collects per-provider URL overrides before validating them into a table
#[derive(Debug, Clone)]
pub struct RouteTableBuilder {
    real: [String; 4],
    proxy: [String; 4],
}

impl Default for RouteTableBuilder {
    fn default() -> Self {
        Self {
            real: Provider::ALL.map(|provider| provider.real_base_url().to_string()),
            proxy: Provider::ALL.map(|provider| default_proxy_url(provider).to_string()),
        }
    }
}

impl RouteTableBuilder {
    /// Override where a provider's real API lives
    pub fn real_base(mut self, provider: Provider, url: impl Into<String>) -> Self {
        self.real[slot(provider)] = url.into();
        self
    }

    /// Override the Helicone endpoint for a provider
    pub fn proxy_base(mut self, provider: Provider, url: impl Into<String>) -> Self {
        self.proxy[slot(provider)] = url.into();
        self
    }

    pub fn build(self) -> RedirectResult<RouteTable> {
        let route = |provider: Provider| {
            ProviderRoute::new(
                provider,
                &self.real[slot(provider)],
                &self.proxy[slot(provider)],
            )
        };

        Ok(RouteTable {
            openai: route(Provider::OpenAi)?,
            anthropic: route(Provider::Anthropic)?,
            groq: route(Provider::Groq)?,
            google: route(Provider::Google)?,
        })
    }
}

/// Default Helicone endpoint for a provider
pub fn default_proxy_url(provider: Provider) -> &'static str {
    match provider {
        Provider::OpenAi => OPENAI_PROXY_URL,
        Provider::Anthropic => ANTHROPIC_PROXY_URL,
        Provider::Groq => GROQ_PROXY_URL,
        Provider::Google => GATEWAY_PROXY_URL,
    }
}

fn slot(provider: Provider) -> usize {
    match provider {
        Provider::OpenAi => 0,
        Provider::Anthropic => 1,
        Provider::Groq => 2,
        Provider::Google => 3,
    }
}

fn parse_base(raw: &str) -> RedirectResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| RedirectError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RedirectError::InvalidUrl(format!(
            "{}: scheme must be http or https",
            raw
        )));
    }
    if url.host_str().is_none() {
        return Err(RedirectError::InvalidUrl(format!("{}: missing host", raw)));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(RedirectError::InvalidUrl(format!(
            "{}: base URL must not carry a query or fragment",
            raw
        )));
    }

    Ok(url)
}

/// Path remaining after `base`, when `url` lives under it
fn strip_base<'a>(url: &'a Url, base: &Url) -> Option<&'a str> {
    if url.scheme() != base.scheme()
        || url.host_str() != base.host_str()
        || url.port_or_known_default() != base.port_or_known_default()
    {
        return None;
    }

    let prefix = base.path().trim_end_matches('/');
    let rest = url.path().strip_prefix(prefix)?;
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}

fn rebase(original: &Url, rest: &str, onto: &Url) -> Url {
    let mut url = onto.clone();
    let prefix = onto.path().trim_end_matches('/');
    url.set_path(&format!("{}{}", prefix, rest));
    url.set_query(original.query());
    url.set_fragment(original.fragment());
    url
}
