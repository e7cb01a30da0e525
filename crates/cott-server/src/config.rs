//! Server configuration from environment variables
//!
//! | Variable            | Default        | Meaning                                     |
//! |---------------------|----------------|---------------------------------------------|
//! | `COTT_BIND`         | `0.0.0.0:5000` | Socket address to listen on                 |
//! | `COTT_DEBUG`        | off            | Seed the demo device, allow any CORS origin |
//! | `COTT_FALLBACK_KEY` | unset          | Hex key answered for every unknown device   |
//!
//! Log filtering is controlled separately through `RUST_LOG`.

use cott::{CottError, KeyStore, MemoryKeyStore, SymmetricKey, DEMO_DEVICE_ID, DEMO_KEY};
use std::net::SocketAddr;
use thiserror::Error;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid COTT_BIND address '{value}': {source}")]
    InvalidBind {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("Invalid COTT_FALLBACK_KEY: {0}")]
    InvalidFallbackKey(#[source] CottError),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: SocketAddr,
    pub debug: bool,
    pub fallback_key: Option<SymmetricKey>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_value = lookup("COTT_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::InvalidBind {
                value: bind_value.clone(),
                source,
            })?;

        let debug = lookup("COTT_DEBUG")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let fallback_key = lookup("COTT_FALLBACK_KEY")
            .map(|v| SymmetricKey::from_hex(v.trim()))
            .transpose()
            .map_err(ConfigError::InvalidFallbackKey)?;

        Ok(Self {
            bind,
            debug,
            fallback_key,
        })
    }

    /// Build the key store this configuration describes
    pub fn key_store(&self) -> MemoryKeyStore {
        let store = match &self.fallback_key {
            Some(key) => MemoryKeyStore::with_fallback(key.clone()),
            None => MemoryKeyStore::new(),
        };
        if self.debug {
            store.set(DEMO_DEVICE_ID.into(), DEMO_KEY.into());
        }
        store
    }
}
