//! tiercache - operator tool for a two-tier cache deployment
//!
//! Reads the same `TIERCACHE_*` environment variables as the library's
//! `Config::from_env` and operates on keys given as JSON. A JSON key yields
//! the same fingerprint as any Rust value serializing to that JSON.
//!
//! ```text
//! tiercache fingerprint '{"id":10,"limit":2}'
//! tiercache get list '{"id":10,"limit":2}'
//! tiercache expire '{"id":10,"limit":2}'
//! tiercache ping
//! ```

use anyhow::{bail, Context};
use serde_json::Value;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiercache::{fingerprint, CacheError, Config, TieredCache, Variant};

const USAGE: &str = "usage: tiercache <fingerprint <json> | expire <json> | get <raw|list|count|computed-int> <json> | ping>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tiercache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["fingerprint", key] => {
            println!("{}", fingerprint(&parse_key(key)?)?);
        }
        ["expire", key] => {
            let key = parse_key(key)?;
            let cache = connect().await?;
            cache.expire(&key).await.context("expire failed")?;
            info!(fingerprint = %fingerprint(&key)?, "expired");
        }
        ["get", variant, key] => {
            let variant: Variant = variant.parse().map_err(anyhow::Error::msg)?;
            let key = parse_key(key)?;
            let cache = connect().await?;
            match cache.lookup::<_, Value>(variant, &key).await {
                Ok(value) => println!("{}", serde_json::to_string_pretty(&value)?),
                Err(CacheError::NotFound(logical_key)) => {
                    eprintln!("miss: {logical_key}");
                    std::process::exit(1);
                }
                Err(err) => return Err(err).context("lookup failed"),
            }
        }
        ["ping"] => {
            let cache = connect().await?;
            if !cache.probe().await {
                bail!("remote tier unreachable");
            }
            println!("PONG");
        }
        _ => bail!(USAGE),
    }

    Ok(())
}

fn parse_key(raw: &str) -> anyhow::Result<Value> {
    serde_json::from_str(raw).with_context(|| format!("key is not valid JSON: {raw}"))
}

async fn connect() -> anyhow::Result<TieredCache<tiercache::RedisStore>> {
    let config = Config::from_env();
    info!(
        addr = %config.addr,
        db = config.db,
        "loading configuration from environment"
    );
    TieredCache::connect(&config)
        .await
        .context("invalid cache configuration")
}
