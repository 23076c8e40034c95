//! chatty - Paced Streaming Chat Client
//!
//! Sends a message to a streaming chat endpoint and types the reply out in
//! the terminal at a steady pace, however the network delivers it.
//!
//! # Usage
//!
//! ```bash
//! # Interactive session against the default endpoint
//! chatty
//!
//! # One-shot message
//! chatty "What's the weather like?"
//!
//! # Custom endpoint and pacing
//! chatty --endpoint http://127.0.0.1:9000/stream --interval-ms 20
//!
//! # Verbose logging (written to stderr)
//! RUST_LOG=debug chatty
//! ```
//!
//! Settings are layered: command line, then `CHATTY_*` environment variables,
//! then the config file, then built-in defaults.

mod repl;
mod sink;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use chatty_core::{
    load_config, ChatBackend, ChatClient, ChatSession, ChattyConfig, ConfigOverrides,
    StreamConsumerLoop,
};

use sink::TerminalSink;

/// Paced streaming chat client
#[derive(Parser, Debug)]
#[command(name = "chatty")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Message to send; starts an interactive session when omitted
    message: Option<String>,

    /// Streaming endpoint URL
    #[arg(short = 'e', long, value_name = "URL")]
    endpoint: Option<String>,

    /// Milliseconds between revealed characters
    #[arg(short = 'i', long, value_name = "MS")]
    interval_ms: Option<u64>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout_secs: Option<u64>,

    /// Configuration file path
    #[arg(short = 'c', long, env = "CHATTY_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            reveal_interval_ms: self.interval_ms,
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

/// Initialize logging with the specified level
///
/// Logs go to stderr so they never interleave with the revealed reply.
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("chatty={level},chatty_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &Args) -> Result<ChattyConfig> {
    let file = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    let config = ChattyConfig::resolve(&file, &ConfigOverrides::from_env(), &args.overrides())
        .context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let config = resolve_config(&args)?;
    info!(
        endpoint = %config.endpoint.url,
        endpoint_source = %config.sources.endpoint,
        reveal_interval_ms = config.reveal.reveal_interval_ms,
        reveal_source = %config.sources.reveal_interval,
        "chatty starting"
    );

    let client = ChatClient::new(&config.endpoint)?;
    if !client.health_check().await {
        warn!(endpoint = %client.endpoint(), "Endpoint is not reachable yet");
    }

    let mut session = ChatSession::new(client, StreamConsumerLoop::from_config(&config.reveal));
    let mut sink = TerminalSink::new(tokio::io::stdout());

    match args.message {
        Some(message) => repl::send_message(&mut session, &mut sink, message)
            .await
            .context("Request failed"),
        None => repl::run(&mut session, &mut sink).await,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_one_shot_args() {
        let args = Args::try_parse_from([
            "chatty",
            "--endpoint",
            "http://127.0.0.1:9000/stream",
            "-i",
            "20",
            "hello",
        ])
        .unwrap();

        assert_eq!(args.message.as_deref(), Some("hello"));
        let overrides = args.overrides();
        assert_eq!(overrides.reveal_interval_ms, Some(20));
        assert_eq!(
            overrides.endpoint.as_deref(),
            Some("http://127.0.0.1:9000/stream")
        );
        assert_eq!(overrides.timeout_secs, None);
    }

    #[test]
    fn test_interactive_args() {
        let args = Args::try_parse_from(["chatty", "--timeout-secs", "30"]).unwrap();
        assert!(args.message.is_none());
        assert_eq!(args.overrides().timeout_secs, Some(30));
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn test_rejects_non_numeric_interval() {
        assert!(Args::try_parse_from(["chatty", "--interval-ms", "fast"]).is_err());
    }
}
