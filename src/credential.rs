//! Helicone authentication credential
//!
//! One key is shared read-only by every provider route. It is never printed:
//! both `Debug` and `Display` redact it.

use std::fmt;

use reqwest::header::HeaderValue;

use crate::error::{RedirectError, RedirectResult};

/// Helicone API key
#[derive(Clone)]
pub struct Credential {
    bearer: HeaderValue,
}

impl Credential {
    /// Wrap a Helicone API key, rejecting empty or non-header-safe values
    pub fn new(key: impl AsRef<str>) -> RedirectResult<Self> {
        let key = key.as_ref().trim();
        if key.is_empty() {
            return Err(RedirectError::InvalidCredential(
                "key is empty".to_string(),
            ));
        }
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", key)).map_err(|_| {
            RedirectError::InvalidCredential("key contains characters not allowed in a header".to_string())
        })?;
        bearer.set_sensitive(true);
        Ok(Self { bearer })
    }

    /// `Bearer <key>` header value, marked sensitive so it is skipped by
    /// header debug output
    pub fn bearer(&self) -> HeaderValue {
        self.bearer.clone()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential").field("key", &"<redacted>").finish()
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<redacted>")
    }
}
