//! Common test utilities for the Helicone redirector
//!
//! Shared fixtures for building redirectors whose proxy endpoints point at
//! wiremock servers while the real provider bases stay untouched.

#![allow(dead_code)]

use helicone_redirect::{Credential, Provider, ProviderKeys, Redirector, RouteTable};

/// Test configuration constants
pub mod constants {
    /// Helicone key used by every test redirector
    pub const TEST_HELICONE_KEY: &str = "sk-helicone-test";
    /// Provider key used for every provider
    pub const TEST_PROVIDER_KEY: &str = "test-provider-key";
}

/// Provider keys with the same test key for every provider
pub fn provider_keys() -> ProviderKeys {
    Provider::ALL
        .into_iter()
        .fold(ProviderKeys::new(), |keys, provider| {
            keys.with_key(provider, constants::TEST_PROVIDER_KEY)
        })
}

/// Route table sending every provider to `proxy_uri`
pub fn routes_via(proxy_uri: &str) -> RouteTable {
    Provider::ALL
        .into_iter()
        .fold(RouteTable::builder(), |builder, provider| {
            builder.proxy_base(provider, proxy_uri)
        })
        .build()
        .expect("mock server URI is a valid proxy base")
}

/// Redirector proxying to `proxy_uri` with the test Helicone key
pub fn redirector_via(proxy_uri: &str) -> Redirector {
    Redirector::new_for_testing(
        routes_via(proxy_uri),
        Some(Credential::new(constants::TEST_HELICONE_KEY).unwrap()),
        provider_keys(),
    )
}

/// Redirector proxying to `proxy_uri` with no Helicone key configured
pub fn redirector_without_key(proxy_uri: &str) -> Redirector {
    Redirector::new_for_testing(routes_via(proxy_uri), None, provider_keys())
}
