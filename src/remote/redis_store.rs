//! Redis-backed remote store.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use redis::aio::MultiplexedConnection;
use redis::{
    AsyncCommands, Client, ConnectionAddr, ConnectionInfo, IntoConnectionInfo, RedisConnectionInfo,
    RedisResult,
};
use tracing::{debug, warn};

use super::RemoteStore;
use crate::config::Config;
use crate::error::{CacheError, Result};

const DEFAULT_PORT: u16 = 6379;

/// Remote store over a multiplexed Redis connection.
///
/// The connection is opened on first use and dropped after a transport
/// failure, so the next call reconnects.
pub struct RedisStore {
    client: Client,
    connection: Mutex<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Builds a client for `host:port` or a `redis://` URL without connecting.
    ///
    /// A configured password or non-zero `db` overrides what the URL carries.
    pub fn open(addr: &str, password: Option<&str>, db: i64) -> Result<Self> {
        let info = if addr.starts_with("redis://") || addr.starts_with("rediss://") {
            url_connection_info(addr, password, db)?
        } else {
            connection_info(addr, password, db)?
        };
        let client = Client::open(info)
            .map_err(|e| CacheError::Config(format!("invalid redis address {addr}: {e}")))?;

        Ok(Self {
            client,
            connection: Mutex::new(None),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::open(&config.addr, config.password.as_deref(), config.db)
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let cached = self.connection.lock().clone();
        if let Some(conn) = cached {
            return Ok(conn);
        }

        debug!("opening redis connection");
        let conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(CacheError::from)?;
        *self.connection.lock() = Some(conn.clone());
        Ok(conn)
    }

    fn fail(&self, err: redis::RedisError) -> CacheError {
        if err.is_connection_dropped() || err.is_io_error() || err.is_connection_refusal() {
            warn!(error = %err, "redis connection lost");
            *self.connection.lock() = None;
        }
        CacheError::from(err)
    }
}

#[async_trait]
impl RemoteStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.connection().await?;
        let result: RedisResult<Option<Vec<u8>>> = conn.get(key).await;
        result.map_err(|e| self.fail(e))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = conn.pset_ex(key, value, millis).await;
        result.map_err(|e| self.fail(e))
    }

    async fn delete(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.connection().await?;
        let result: RedisResult<()> = conn.del(keys).await;
        result.map_err(|e| self.fail(e))
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
        result.map(|_| ()).map_err(|e| self.fail(e))
    }
}

fn url_connection_info(url: &str, password: Option<&str>, db: i64) -> Result<ConnectionInfo> {
    let mut info = url
        .into_connection_info()
        .map_err(|e| CacheError::Config(format!("invalid redis address {url}: {e}")))?;
    if let Some(password) = password {
        info.redis.password = Some(password.to_string());
    }
    if db != 0 {
        info.redis.db = db;
    }
    Ok(info)
}

fn connection_info(addr: &str, password: Option<&str>, db: i64) -> Result<ConnectionInfo> {
    let (host, port) = match addr.rsplit_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| CacheError::Config(format!("invalid port in address {addr}")))?;
            (host, port)
        }
        None => (addr, DEFAULT_PORT),
    };
    if host.is_empty() {
        return Err(CacheError::Config(format!("missing host in address {addr}")));
    }

    Ok(ConnectionInfo {
        addr: ConnectionAddr::Tcp(host.to_string(), port),
        redis: RedisConnectionInfo {
            db,
            password: password.map(str::to_string),
            ..Default::default()
        },
    })
}
