//! Supported AI providers
//!
//! The set is closed: every provider has exactly one route in the
//! [`RouteTable`](crate::route::RouteTable), so an unknown identifier can only
//! come from parsing a string.

use std::fmt;
use std::str::FromStr;

use crate::error::RedirectError;

/// AI provider whose traffic is redirected through Helicone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// General chat completions
    OpenAi,
    /// Reasoning models
    Anthropic,
    /// Fast inference
    Groq,
    /// Multimodal (Gemini)
    Google,
}

impl Provider {
    /// All providers, in route table order
    pub const ALL: [Provider; 4] = [
        Provider::OpenAi,
        Provider::Anthropic,
        Provider::Groq,
        Provider::Google,
    ];

    /// Stable lowercase identifier used in logs, metrics and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Groq => "groq",
            Provider::Google => "google",
        }
    }

    /// Scheme and host of the provider's public API
    pub fn real_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com",
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::Groq => "https://api.groq.com",
            Provider::Google => "https://generativelanguage.googleapis.com",
        }
    }

    /// Prefix for per-provider environment variables
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI",
            Provider::Anthropic => "ANTHROPIC",
            Provider::Groq => "GROQ",
            Provider::Google => "GOOGLE",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = RedirectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "groq" => Ok(Provider::Groq),
            "google" | "gemini" => Ok(Provider::Google),
            _ => Err(RedirectError::UnknownProvider(s.to_string())),
        }
    }
}
