//! Settings validation.
//!
//! # Responsibilities
//! - Required credentials present and non-empty
//! - Every chain entry complete (RPC URL and private key)
//! - URLs parse as http(s)
//! - Timeouts positive
//!
//! Returns all validation errors, not just the first.

use std::fmt;

use crate::config::schema::{
    ChainSettings, RawSettings, SecretString, Settings, DEFAULT_CONFIRMATION_TIMEOUT_SECS,
    DEFAULT_LOG_LEVEL, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_RPC_TIMEOUT_SECS,
};

/// A single semantic problem with the settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted field path, e.g. `chains.56.rpc_url`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn required(
    value: Option<&String>,
    field: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    let value = non_empty(value);
    if value.is_none() {
        errors.push(ValidationError::new(field, "is required"));
    }
    value
}

fn check_http_url(value: &str, field: &str, errors: &mut Vec<ValidationError>) {
    match url::Url::parse(value) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(ValidationError::new(
            field,
            format!("unsupported scheme '{}'", url.scheme()),
        )),
        Err(e) => errors.push(ValidationError::new(field, format!("invalid URL: {}", e))),
    }
}

fn positive(value: Option<u64>, default: u64, field: &str, errors: &mut Vec<ValidationError>) -> u64 {
    let value = value.unwrap_or(default);
    if value == 0 {
        errors.push(ValidationError::new(field, "must be greater than 0"));
    }
    value
}

/// Turn raw settings into validated [`Settings`].
///
/// `errors` may already hold problems found while reading the source
/// (e.g. unparsable numbers); they are reported together with the semantic ones.
pub fn validate_settings(
    raw: RawSettings,
    mut errors: Vec<ValidationError>,
) -> Result<Settings, Vec<ValidationError>> {
    let api_key = required(raw.okx_api_key.as_ref(), "okx_api_key", &mut errors);
    let secret_key = required(raw.okx_secret_key.as_ref(), "okx_secret_key", &mut errors);
    let passphrase = required(
        raw.okx_api_passphrase.as_ref(),
        "okx_api_passphrase",
        &mut errors,
    );

    let base_url = raw.base_url_or_default();
    check_http_url(&base_url, "base_url", &mut errors);

    let http_proxy = non_empty(raw.http_proxy.as_ref());
    if let Some(proxy) = &http_proxy {
        check_http_url(proxy, "http_proxy", &mut errors);
    }

    let request_timeout_secs = positive(
        raw.request_timeout_secs,
        DEFAULT_REQUEST_TIMEOUT_SECS,
        "request_timeout_secs",
        &mut errors,
    );
    let rpc_timeout_secs = positive(
        raw.rpc_timeout_secs,
        DEFAULT_RPC_TIMEOUT_SECS,
        "rpc_timeout_secs",
        &mut errors,
    );
    let confirmation_timeout_secs = positive(
        raw.confirmation_timeout_secs,
        DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        "confirmation_timeout_secs",
        &mut errors,
    );

    let mut chains = std::collections::BTreeMap::new();
    for (chain_id, chain) in &raw.chains {
        if chain_id.trim().is_empty() || !chain_id.chars().all(|c| c.is_ascii_digit()) {
            errors.push(ValidationError::new(
                format!("chains.{}", chain_id),
                "chain id must be a numeric chain index",
            ));
            continue;
        }
        let rpc_url = required(
            chain.rpc_url.as_ref(),
            &format!("chains.{}.rpc_url", chain_id),
            &mut errors,
        );
        let private_key = required(
            chain.private_key.as_ref(),
            &format!("chains.{}.private_key", chain_id),
            &mut errors,
        );
        if let Some(url) = &rpc_url {
            check_http_url(url, &format!("chains.{}.rpc_url", chain_id), &mut errors);
        }
        if let (Some(rpc_url), Some(private_key)) = (rpc_url, private_key) {
            chains.insert(
                chain_id.clone(),
                ChainSettings {
                    rpc_url,
                    private_key: SecretString::new(private_key),
                },
            );
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // The required fields are Some here: any None pushed an error above.
    match (api_key, secret_key, passphrase) {
        (Some(api_key), Some(secret_key), Some(passphrase)) => Ok(Settings {
            okx_api_key: api_key,
            okx_secret_key: SecretString::new(secret_key),
            okx_api_passphrase: SecretString::new(passphrase),
            okx_project_id: non_empty(raw.okx_project_id.as_ref()),
            http_proxy,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout_secs,
            rpc_timeout_secs,
            confirmation_timeout_secs,
            log_level: non_empty(raw.log_level.as_ref())
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            chains,
        }),
        _ => Err(vec![ValidationError::new("okx", "credentials incomplete")]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RawChainSettings;

    fn complete_raw() -> RawSettings {
        RawSettings {
            okx_api_key: Some("key".into()),
            okx_secret_key: Some("secret".into()),
            okx_api_passphrase: Some("pass".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_minimal_settings_get_defaults() {
        let settings = validate_settings(complete_raw(), Vec::new()).unwrap();
        assert_eq!(settings.base_url, "https://web3.okx.com");
        assert_eq!(settings.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);
        assert_eq!(settings.log_level, "info");
        assert!(settings.okx_project_id.is_none());
        assert!(settings.chains.is_empty());
    }

    #[test]
    fn test_all_errors_are_reported() {
        let mut raw = RawSettings::default();
        raw.request_timeout_secs = Some(0);
        let errors = validate_settings(raw, Vec::new()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert!(fields.contains(&"okx_api_key"));
        assert!(fields.contains(&"okx_secret_key"));
        assert!(fields.contains(&"okx_api_passphrase"));
        assert!(fields.contains(&"request_timeout_secs"));
    }

    #[test]
    fn test_incomplete_chain_rejected() {
        let mut raw = complete_raw();
        raw.chains.insert(
            "56".into(),
            RawChainSettings {
                rpc_url: Some("https://bsc-dataseed.binance.org".into()),
                private_key: None,
            },
        );
        let errors = validate_settings(raw, Vec::new()).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "chains.56.private_key");
    }

    #[test]
    fn test_bad_rpc_url_rejected() {
        let mut raw = complete_raw();
        raw.chains.insert(
            "1".into(),
            RawChainSettings {
                rpc_url: Some("not a url".into()),
                private_key: Some("0xabc".into()),
            },
        );
        let errors = validate_settings(raw, Vec::new()).unwrap_err();
        assert!(errors[0].to_string().starts_with("chains.1.rpc_url: invalid URL"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let mut raw = complete_raw();
        raw.base_url = Some("http://127.0.0.1:9000/".into());
        let settings = validate_settings(raw, Vec::new()).unwrap();
        assert_eq!(settings.base_url, "http://127.0.0.1:9000");
    }
}
