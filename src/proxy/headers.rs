//! Header utilities for Helicone proxying
//!
//! Builds the header set for a redirected request. The caller's headers are
//! copied, never mutated, and only the Helicone headers are added or replaced.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::credential::Credential;

/// Helicone authentication header
pub const HELICONE_AUTH: HeaderName = HeaderName::from_static("helicone-auth");

/// Upstream the Helicone gateway should re-dispatch to
pub const HELICONE_TARGET_URL: HeaderName = HeaderName::from_static("helicone-target-url");

/// Copy `existing` and add the Helicone headers
///
/// `Helicone-Auth` replaces every prior value for that name. The target header
/// is only written when the route supplies one.
pub fn inject_proxy_headers(
    existing: &HeaderMap,
    credential: &Credential,
    target_url: Option<&HeaderValue>,
) -> HeaderMap {
    let mut headers = existing.clone();

    headers.insert(HELICONE_AUTH, credential.bearer());
    if let Some(target) = target_url {
        headers.insert(HELICONE_TARGET_URL, target.clone());
    }

    headers
}
