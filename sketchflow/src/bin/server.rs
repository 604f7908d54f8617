//! `sketchflow-server`: HTTP front end for drawing requests.
//!
//! | Variable | Meaning | Default |
//! |----------|---------|---------|
//! | `SKETCHFLOW_ADDR` | Listen address | `127.0.0.1:3000` |
//! | `SKETCHFLOW_MAX_RETRIES` | Retries when opening an upstream stream | `0` |
//! | `SKETCHFLOW_LOG_FORMAT` | `json` for JSON logs | text |
//! | `RUST_LOG` | Log filter | `info` |
//!
//! Endpoint defaults come from `ChatConfig::from_env`.

use anyhow::Context;
use sketchflow::{ChatConfig, ChatServer, RetryConfig};
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("SKETCHFLOW_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn retry_from_env() -> anyhow::Result<RetryConfig> {
    match std::env::var("SKETCHFLOW_MAX_RETRIES") {
        Ok(raw) => {
            let retries: u32 = raw
                .trim()
                .parse()
                .with_context(|| format!("SKETCHFLOW_MAX_RETRIES is not a number: {raw}"))?;
            Ok(RetryConfig::for_api().max_retries(retries))
        }
        Err(_) => Ok(RetryConfig::no_retry()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let defaults = ChatConfig::from_env().context("invalid endpoint configuration")?;
    let retry = retry_from_env()?;
    let addr: SocketAddr = std::env::var("SKETCHFLOW_ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()
        .context("SKETCHFLOW_ADDR is not a socket address")?;

    tracing::info!(
        %addr,
        base_url = %defaults.base_url,
        model = %defaults.model,
        has_api_key = !defaults.api_key.is_empty(),
        max_retries = retry.max_retries,
        "sketchflow-server starting"
    );

    ChatServer::new(defaults).retry(retry).serve(addr).await?;
    Ok(())
}
