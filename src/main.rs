//! Helicone redirect - command line entry point
//!
//! Inspects the route table and sends one-off completions through Helicone.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::Url;
use serde_json::{json, Value};
use tracing::info;

use helicone_redirect::{Config, Provider, Redirector, RouteTable};

/// Route AI provider traffic through the Helicone proxy
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the provider route table
    Routes,

    /// Show how a provider URL would be rewritten
    Resolve {
        /// Absolute URL of a provider API request
        url: String,
    },

    /// Send a single-prompt completion through Helicone
    Complete {
        /// openai, anthropic, groq or google
        provider: String,
        /// Model identifier, passed through to the provider unchecked
        model: String,
        /// User prompt
        prompt: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = Config::from_env()?;
    let redirector = Redirector::new(&config)?;

    match cli.command {
        Commands::Routes => {
            for route in redirector.routes().iter() {
                println!(
                    "{:<10} {:<45} -> {:<32} {}",
                    route.provider(),
                    route.real_base().as_str(),
                    route.proxy_base().as_str(),
                    route.strategy().as_str()
                );
            }
        }
        Commands::Resolve { url } => {
            let url = Url::parse(&url).with_context(|| format!("Invalid URL: {}", url))?;
            print!("{}", describe_resolution(redirector.routes(), &url));
        }
        Commands::Complete {
            provider,
            model,
            prompt,
        } => {
            let client = redirector.client_for(&provider, model)?;
            info!(provider = %client.provider(), model = %client.model(), "Sending completion");

            let response: Value = client
                .complete(&prompt_body(client.provider(), &prompt))
                .await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}

/// Human-readable account of how `url` would leave the process
fn describe_resolution(routes: &RouteTable, url: &Url) -> String {
    let Some(route) = routes.route_for_url(url) else {
        return format!("No provider route matches {}; it would be sent unchanged\n", url);
    };

    let rewrite = route.rewrite_url(url);
    let mut out = format!(
        "provider: {}\noutcome:  {}\nurl:      {}\nheaders:  Helicone-Auth: Bearer <HELICONE_API_KEY>\n",
        route.provider(),
        rewrite.outcome.as_str(),
        rewrite.url
    );
    if let Some(target) = route.target_header_for(rewrite.outcome) {
        out.push_str(&format!(
            "          Helicone-Target-URL: {}\n",
            target.to_str().unwrap_or_default()
        ));
    }
    out
}

/// Minimal single-turn request body in each provider's native shape
fn prompt_body(provider: Provider, prompt: &str) -> Value {
    match provider {
        Provider::OpenAi | Provider::Groq => json!({
            "messages": [{ "role": "user", "content": prompt }],
        }),
        Provider::Anthropic => json!({
            "max_tokens": 1024,
            "messages": [{ "role": "user", "content": prompt }],
        }),
        Provider::Google => json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        }),
    }
}

fn init_tracing(json_logs: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "helicone_redirect=info".into());

    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}
