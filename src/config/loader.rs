//! Settings loading from the environment, a `.env` file, or TOML on disk.

use std::ffi::OsString;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::{RawSettings, Settings};
use crate::config::validation::{validate_settings, ValidationError};

/// Delimiter for nested keys, e.g. `CHAINS__56__RPC_URL`.
pub const ENV_NESTED_DELIMITER: &str = "__";

const CHAINS_PREFIX: &str = "CHAINS__";

/// Error type for settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_secs(key: &str, value: &str, errors: &mut Vec<ValidationError>) -> Option<u64> {
    match value.trim().parse::<u64>() {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(ValidationError::new(
                key.to_ascii_lowercase(),
                format!("'{}' is not a whole number of seconds", value),
            ));
            None
        }
    }
}

/// Map `(key, value)` pairs onto raw settings. Keys are case-insensitive;
/// unrelated keys are ignored.
pub fn raw_from_vars<I, K, V>(vars: I) -> (RawSettings, Vec<ValidationError>)
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut raw = RawSettings::default();
    let mut errors = Vec::new();

    for (key, value) in vars {
        let key = key.as_ref().to_ascii_uppercase();
        let value: String = value.into();

        match key.as_str() {
            "OKX_API_KEY" => raw.okx_api_key = Some(value),
            "OKX_SECRET_KEY" => raw.okx_secret_key = Some(value),
            "OKX_API_PASSPHRASE" => raw.okx_api_passphrase = Some(value),
            "OKX_PROJECT_ID" => raw.okx_project_id = Some(value),
            "OKX_HTTP_PROXY" => raw.http_proxy = Some(value),
            "OKX_BASE_URL" => raw.base_url = Some(value),
            "OKX_LOG_LEVEL" => raw.log_level = Some(value),
            "OKX_REQUEST_TIMEOUT_SECS" => {
                raw.request_timeout_secs = parse_secs(&key, &value, &mut errors)
            }
            "OKX_RPC_TIMEOUT_SECS" => raw.rpc_timeout_secs = parse_secs(&key, &value, &mut errors),
            "OKX_CONFIRMATION_TIMEOUT_SECS" => {
                raw.confirmation_timeout_secs = parse_secs(&key, &value, &mut errors)
            }
            _ => {
                let Some(rest) = key.strip_prefix(CHAINS_PREFIX) else {
                    continue;
                };
                let Some((chain_id, field)) = rest.split_once(ENV_NESTED_DELIMITER) else {
                    errors.push(ValidationError::new(
                        key.to_ascii_lowercase(),
                        "expected CHAINS__<chain_id>__<FIELD>",
                    ));
                    continue;
                };
                let entry = raw.chains.entry(chain_id.to_string()).or_default();
                match field {
                    "RPC_URL" => entry.rpc_url = Some(value),
                    "PRIVATE_KEY" => entry.private_key = Some(value),
                    other => errors.push(ValidationError::new(
                        format!("chains.{}.{}", chain_id, other.to_ascii_lowercase()),
                        "unknown chain setting",
                    )),
                }
            }
        }
    }

    (raw, errors)
}

/// Load and validate settings from explicit `(key, value)` pairs.
pub fn load_from_vars<I, K, V>(vars: I) -> Result<Settings, ConfigError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let (raw, errors) = raw_from_vars(vars);
    validate_settings(raw, errors).map_err(ConfigError::Validation)
}

/// Whether `key` is one this loader maps onto settings.
fn is_recognised_key(key: &str) -> bool {
    let key = key.to_ascii_uppercase();
    key.starts_with("OKX_") || key.starts_with(CHAINS_PREFIX)
}

/// UTF-8 view of OS environment pairs.
///
/// Entries the loader does not read are skipped when they are not valid
/// UTF-8; a recognised key with a non-UTF-8 value is a parse error.
pub fn utf8_vars<I>(vars: I) -> Result<Vec<(String, String)>, ConfigError>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    let mut out = Vec::new();
    for (key, value) in vars {
        let Ok(key) = key.into_string() else {
            continue;
        };
        match value.into_string() {
            Ok(value) => out.push((key, value)),
            Err(_) if is_recognised_key(&key) => {
                return Err(ConfigError::Parse(format!("{} is not valid UTF-8", key)));
            }
            Err(_) => tracing::debug!(key = %key, "Skipping non-UTF-8 environment variable"),
        }
    }
    Ok(out)
}

/// Load settings from `.env` (if present) overlaid by the process environment.
///
/// Process variables take precedence over `.env` entries. Only `OKX_*` and
/// `CHAINS__*` keys are read, so host-wide variables such as `HTTP_PROXY`
/// never affect the SDK.
pub fn load_from_env() -> Result<Settings, ConfigError> {
    let mut vars: Vec<(String, String)> = Vec::new();

    match dotenvy::dotenv_iter() {
        Ok(iter) => {
            for item in iter {
                let (k, v) = item.map_err(|e| ConfigError::Parse(format!(".env: {}", e)))?;
                vars.push((k, v));
            }
            tracing::debug!(entries = vars.len(), "Loaded .env file");
        }
        Err(e) if e.not_found() => {}
        Err(e) => return Err(ConfigError::Parse(format!(".env: {}", e))),
    }

    // Later entries win, so process variables go last.
    vars.extend(utf8_vars(std::env::vars_os())?);
    load_from_vars(vars)
}

/// Load and validate settings from a TOML file.
pub fn load_config(path: &Path) -> Result<Settings, ConfigError> {
    let content = fs::read_to_string(path)?;
    let raw: RawSettings =
        toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

    validate_settings(raw, Vec::new()).map_err(ConfigError::Validation)
}

impl Settings {
    /// See [`load_from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        load_from_env()
    }

    /// See [`load_from_vars`].
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        load_from_vars(vars)
    }

    /// See [`load_config`].
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        load_config(path)
    }
}
