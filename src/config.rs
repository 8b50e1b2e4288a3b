//! Configuration Module
//!
//! Handles loading cache configuration from environment variables and
//! resolving it into the settings used at construction time.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default per-call deadline for remote store operations.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Default local tier capacity.
pub const DEFAULT_LOCAL_MAX_ENTRIES: usize = 300;

/// Cache configuration parameters.
///
/// Optional fields fall back to defaults in [`Config::resolve`]. The remote
/// address and the remote TTL have no default.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote store address as `host:port`
    pub addr: String,
    /// Remote store password
    pub password: Option<String>,
    /// Logical database index
    pub db: i64,
    /// Per-call deadline for remote operations
    pub timeout: Option<Duration>,
    /// TTL applied to every remote write
    pub ttl: Option<Duration>,
    /// Maximum number of local tier entries
    pub local_max_entries: Option<usize>,
    /// Local tier TTL
    pub local_ttl: Option<Duration>,
    /// Whether the local tier is used at all
    pub local_enabled: bool,
}

/// Fully resolved settings, every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub timeout: Duration,
    pub ttl: Duration,
    pub local_max_entries: usize,
    pub local_ttl: Duration,
    pub local_enabled: bool,
}

impl Config {
    /// Creates a config for the given address and remote TTL.
    pub fn new(addr: impl Into<String>, ttl: Duration) -> Self {
        Self {
            addr: addr.into(),
            ttl: Some(ttl),
            ..Self::default()
        }
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn with_db(mut self, db: i64) -> Self {
        self.db = db;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_local_max_entries(mut self, max_entries: usize) -> Self {
        self.local_max_entries = Some(max_entries);
        self
    }

    pub fn with_local_ttl(mut self, local_ttl: Duration) -> Self {
        self.local_ttl = Some(local_ttl);
        self
    }

    pub fn without_local_tier(mut self) -> Self {
        self.local_enabled = false;
        self
    }

    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `TIERCACHE_ADDR` - Remote store address (required for `resolve`)
    /// - `TIERCACHE_PASSWORD` - Remote store password
    /// - `TIERCACHE_DB` - Logical database index (default: 0)
    /// - `TIERCACHE_TIMEOUT_MS` - Remote call deadline in milliseconds (default: 3000)
    /// - `TIERCACHE_TTL_SECS` - Remote TTL in seconds (required for `resolve`)
    /// - `TIERCACHE_LOCAL_MAX_ENTRIES` - Local tier capacity (default: 300)
    /// - `TIERCACHE_LOCAL_TTL_SECS` - Local tier TTL in seconds (default: half the remote TTL)
    /// - `TIERCACHE_LOCAL_ENABLED` - `false` or `0` disables the local tier
    pub fn from_env() -> Self {
        Self {
            addr: env::var("TIERCACHE_ADDR").unwrap_or_default(),
            password: env::var("TIERCACHE_PASSWORD").ok().filter(|p| !p.is_empty()),
            db: parse_var("TIERCACHE_DB").unwrap_or(0),
            timeout: parse_var("TIERCACHE_TIMEOUT_MS").map(Duration::from_millis),
            ttl: parse_var("TIERCACHE_TTL_SECS").map(Duration::from_secs),
            local_max_entries: parse_var("TIERCACHE_LOCAL_MAX_ENTRIES"),
            local_ttl: parse_var("TIERCACHE_LOCAL_TTL_SECS").map(Duration::from_secs),
            local_enabled: env::var("TIERCACHE_LOCAL_ENABLED")
                .map(|v| !matches!(v.trim(), "0" | "false" | "off"))
                .unwrap_or(true),
        }
    }

    /// Validates the config and applies defaults.
    ///
    /// Zero values are treated as unset, so `Duration::ZERO` for the timeout
    /// or local TTL falls back to the default.
    pub fn resolve(&self) -> Result<Settings> {
        if self.addr.trim().is_empty() {
            return Err(CacheError::Config("remote store address is required".into()));
        }
        let ttl = self
            .ttl
            .filter(|ttl| !ttl.is_zero())
            .ok_or_else(|| CacheError::Config("remote TTL is required".into()))?;

        Ok(Settings {
            timeout: self
                .timeout
                .filter(|t| !t.is_zero())
                .unwrap_or(DEFAULT_TIMEOUT),
            ttl,
            local_max_entries: self
                .local_max_entries
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_LOCAL_MAX_ENTRIES),
            local_ttl: self
                .local_ttl
                .filter(|t| !t.is_zero())
                .unwrap_or(ttl / 2),
            local_enabled: self.local_enabled,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: String::new(),
            password: None,
            db: 0,
            timeout: None,
            ttl: None,
            local_max_entries: None,
            local_ttl: None,
            local_enabled: true,
        }
    }
}

impl Settings {
    /// Settings for a given remote TTL with every other value defaulted.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            ttl,
            local_max_entries: DEFAULT_LOCAL_MAX_ENTRIES,
            local_ttl: ttl / 2,
            local_enabled: true,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}
