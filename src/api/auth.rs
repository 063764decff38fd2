//! Request signing for the OKX REST API.
//!
//! # Scheme
//! ```text
//! prehash = timestamp + METHOD + request_path[?query] + body
//! OK-ACCESS-SIGN = Base64(HMAC-SHA256(secret_key, prehash))
//! ```
//!
//! # Security
//! - The secret key and passphrase never appear in `Debug` output or logs

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use sha2::Sha256;

use crate::api::types::ApiError;
use crate::config::{SecretString, Settings};

type HmacSha256 = Hmac<Sha256>;

pub const HEADER_KEY: &str = "OK-ACCESS-KEY";
pub const HEADER_SIGN: &str = "OK-ACCESS-SIGN";
pub const HEADER_TIMESTAMP: &str = "OK-ACCESS-TIMESTAMP";
pub const HEADER_PASSPHRASE: &str = "OK-ACCESS-PASSPHRASE";
pub const HEADER_PROJECT: &str = "OK-ACCESS-PROJECT";

/// API credentials issued by the OKX developer portal.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub secret_key: SecretString,
    pub passphrase: SecretString,
    pub project_id: Option<String>,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<SecretString>,
        passphrase: impl Into<SecretString>,
        project_id: Option<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret_key: secret_key.into(),
            passphrase: passphrase.into(),
            project_id: project_id.filter(|p| !p.is_empty()),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.okx_api_key.clone(),
            settings.okx_secret_key.clone(),
            settings.okx_api_passphrase.clone(),
            settings.okx_project_id.clone(),
        )
    }

    /// Base64 HMAC-SHA256 signature of `timestamp + method + request_path + body`.
    pub fn sign(
        &self,
        timestamp: &str,
        method: &str,
        request_path: &str,
        body: &str,
    ) -> Result<String, ApiError> {
        let mut mac = HmacSha256::new_from_slice(self.secret_key.expose().as_bytes())
            .map_err(|e| ApiError::Signing(e.to_string()))?;
        mac.update(timestamp.as_bytes());
        mac.update(method.as_bytes());
        mac.update(request_path.as_bytes());
        mac.update(body.as_bytes());
        Ok(BASE64.encode(mac.finalize().into_bytes()))
    }

    /// Authentication headers for one request.
    ///
    /// `request_path` includes the leading slash and the query string. Encoded
    /// commas (`%2C`) are signed as literal commas.
    pub fn headers(
        &self,
        method: &str,
        request_path: &str,
        body: &str,
        timestamp: &str,
    ) -> Result<HeaderMap, ApiError> {
        let signed_path = request_path.replace("%2C", ",");
        let signature = self.sign(timestamp, method, &signed_path, body)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        insert(&mut headers, HEADER_KEY, &self.api_key)?;
        insert(&mut headers, HEADER_SIGN, &signature)?;
        insert(&mut headers, HEADER_TIMESTAMP, timestamp)?;
        insert(&mut headers, HEADER_PASSPHRASE, self.passphrase.expose())?;
        if let Some(project) = &self.project_id {
            insert(&mut headers, HEADER_PROJECT, project)?;
        }
        Ok(headers)
    }
}

fn insert(headers: &mut HeaderMap, name: &'static str, value: &str) -> Result<(), ApiError> {
    let header = HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
    let value =
        HeaderValue::from_str(value).map_err(|_| ApiError::InvalidHeader(name.to_string()))?;
    headers.insert(header, value);
    Ok(())
}

/// Current UTC time as ISO-8601 with millisecond precision,
/// e.g. `2020-12-08T09:08:57.715Z`.
pub fn timestamp() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TS: &str = "2020-12-08T09:08:57.715Z";

    fn credentials(project: Option<&str>) -> Credentials {
        Credentials::new("test-key", "test-secret", "test-pass", project.map(String::from))
    }

    #[test]
    fn test_sign_get_with_query() {
        let sig = credentials(None).sign(
            TS,
            "GET",
            "/api/v5/dex/aggregator/quote?chainId=1&amount=1000",
            "",
        )
        .unwrap();
        assert_eq!(sig, "aCF0Su+nSwWesVkoPSA/QvtezWHQnVPKiD6Jl8Qm/tg=");
    }

    #[test]
    fn test_sign_post_with_body() {
        let body = r#"{"chainIndex":"1","tokenContractAddress":"0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee"}"#;
        let sig = credentials(None)
            .sign(TS, "POST", "/api/v5/dex/market/price", body)
            .unwrap();
        assert_eq!(sig, "6S/Srq2FFx2/1tEGPywoxyp9hXk9s1DESTCrdigCGFQ=");
    }

    #[test]
    fn test_headers_sign_decoded_commas() {
        let headers = credentials(None)
            .headers(
                "GET",
                "/api/v5/dex/balance/all-token-balances-by-address?address=0xabc&chains=1%2C56",
                "",
                TS,
            )
            .unwrap();
        assert_eq!(
            headers[HEADER_SIGN],
            "789p/fy6TdPRglpR8A2oRk8Yry4Y/oJTNdkOTzHPVDY="
        );
        assert_eq!(headers[HEADER_KEY], "test-key");
        assert_eq!(headers[HEADER_TIMESTAMP], TS);
        assert_eq!(headers[HEADER_PASSPHRASE], "test-pass");
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert!(headers.get(HEADER_PROJECT).is_none());
    }

    #[test]
    fn test_project_header_only_when_set() {
        let headers = credentials(Some("proj-1"))
            .headers("GET", "/api/v5/dex/aggregator/supported/chain", "", TS)
            .unwrap();
        assert_eq!(headers[HEADER_PROJECT], "proj-1");

        let headers = credentials(Some(""))
            .headers("GET", "/api/v5/dex/aggregator/supported/chain", "", TS)
            .unwrap();
        assert!(headers.get(HEADER_PROJECT).is_none());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp();
        assert_eq!(ts.len(), 24);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
        assert_eq!(&ts[19..20], ".");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let debug = format!("{:?}", credentials(None));
        assert!(!debug.contains("test-secret"));
        assert!(!debug.contains("test-pass"));
    }
}
