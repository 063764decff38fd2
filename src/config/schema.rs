//! Settings schema.
//!
//! [`RawSettings`] is what a source (environment, `.env`, TOML) yields before
//! validation: every field optional. [`Settings`] is the validated, immutable
//! result handed to the client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::constants::DEFAULT_BASE_URL;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// A string that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The underlying secret. Do not log the returned value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString(***)")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl From<&str> for SecretString {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SecretString {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// RPC endpoint and signing key for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainSettings {
    /// JSON-RPC (EVM) or Solana RPC endpoint.
    pub rpc_url: String,
    /// Hex (EVM) or base58 (Solana) private key.
    pub private_key: SecretString,
}

/// Validated SDK settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub okx_api_key: String,
    pub okx_secret_key: SecretString,
    pub okx_api_passphrase: SecretString,
    pub okx_project_id: Option<String>,
    /// HTTP(S) proxy for aggregator calls.
    pub http_proxy: Option<String>,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub rpc_timeout_secs: u64,
    /// Upper bound on waiting for a submitted transaction to land.
    pub confirmation_timeout_secs: u64,
    pub log_level: String,
    /// Per-chain settings keyed by chain index ("1", "56", "501", ...).
    pub chains: BTreeMap<String, ChainSettings>,
}

impl Settings {
    /// Settings for one chain, if configured.
    pub fn chain(&self, chain_id: &str) -> Option<&ChainSettings> {
        self.chains.get(chain_id)
    }

    /// Configured chain ids in ascending order.
    pub fn chain_ids(&self) -> impl Iterator<Item = &str> {
        self.chains.keys().map(String::as_str)
    }
}

/// Unvalidated chain entry.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RawChainSettings {
    pub rpc_url: Option<String>,
    pub private_key: Option<String>,
}

/// Unvalidated settings as read from a source.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub okx_api_key: Option<String>,
    pub okx_secret_key: Option<String>,
    pub okx_api_passphrase: Option<String>,
    pub okx_project_id: Option<String>,
    pub http_proxy: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub rpc_timeout_secs: Option<u64>,
    pub confirmation_timeout_secs: Option<u64>,
    pub log_level: Option<String>,
    pub chains: BTreeMap<String, RawChainSettings>,
}

impl RawSettings {
    pub(crate) fn base_url_or_default(&self) -> String {
        self.base_url
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }
}
