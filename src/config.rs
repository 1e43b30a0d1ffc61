//! Dataset gateway configuration read from the environment.

use secrecy::SecretString;

use crate::error::{FetchError, Result};

/// Environment variable holding the data store base URL.
pub const URL_ENV: &str = "TXN_DASHBOARD_URL";

/// Environment variable holding the data store API key.
pub const API_KEY_ENV: &str = "TXN_DASHBOARD_API_KEY";

/// Environment variable overriding the table name.
pub const TABLE_ENV: &str = "TXN_DASHBOARD_TABLE";

/// Table read when [`TABLE_ENV`] is unset.
pub const DEFAULT_TABLE: &str = "transactions";

/// Location and credentials of the data store.
#[derive(Debug)]
pub struct GatewayConfig {
    /// Base URL of the data store, without the REST prefix.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: SecretString,
    /// Table holding the transaction rows.
    pub table: String,
}

impl GatewayConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingConfig`] if the URL or API key is unset
    /// or empty.
    #[inline]
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value. Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::MissingConfig`] if the URL or API key is
    /// missing.
    #[inline]
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| lookup(name).filter(|value| !value.is_empty());
        let base_url = read(URL_ENV).ok_or(FetchError::MissingConfig(URL_ENV))?;
        let api_key = read(API_KEY_ENV).ok_or(FetchError::MissingConfig(API_KEY_ENV))?;
        let table = read(TABLE_ENV).unwrap_or_else(|| DEFAULT_TABLE.to_owned());
        tracing::debug!(base_url = %base_url, table = %table, "loaded gateway config");

        Ok(Self {
            base_url,
            api_key: SecretString::from(api_key),
            table,
        })
    }
}
