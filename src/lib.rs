//! Helicone redirect - route AI provider traffic through Helicone
//!
//! This library builds OpenAI, Anthropic, Groq and Google clients whose
//! requests are rewritten onto the Helicone observability proxy, with the
//! `Helicone-Auth` header (and `Helicone-Target-URL` for the shared gateway)
//! attached. Each client carries its own transport; no process-wide HTTP state
//! is patched.

pub mod config;
pub mod credential;
pub mod error;
pub mod provider;
pub mod proxy;
pub mod redirector;
pub mod route;

pub use crate::config::{Config, ProviderKeys};
pub use crate::credential::Credential;
pub use crate::error::{RedirectError, RedirectResult};
pub use crate::provider::Provider;
pub use crate::proxy::{OutboundRequest, ProviderClient, RedirectingTransport, Transport};
pub use crate::redirector::{
    anthropic_with_helicone, google_with_helicone, groq_with_helicone, openai_with_helicone,
    Redirector,
};
pub use crate::route::{ProviderRoute, RewriteOutcome, RewriteStrategy, RouteTable};
