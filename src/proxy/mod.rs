//! Proxy module
//!
//! Rewrites provider traffic onto Helicone and the clients that issue it.

pub mod client;
pub mod headers;
pub mod logging;
pub mod transport;

pub use client::ProviderClient;
pub use transport::{HttpTransport, OutboundRequest, RedirectingTransport, RewrittenRequest, Transport};
