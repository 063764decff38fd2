//! Response envelope and API error type.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while talking to the aggregator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, TLS or timeout failure before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Non-2xx status; `body` is the upstream payload as received.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Well-formed response whose `code` is not `"0"`.
    #[error("OKX API error {code}: {msg}")]
    Upstream { code: String, msg: String },

    /// Body that does not match the expected shape.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Successful response without the record the caller needs.
    #[error("Empty response data from {0}")]
    EmptyData(String),

    #[error("Invalid value for header {0}")]
    InvalidHeader(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Client build failed: {0}")]
    Build(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e.to_string())
    }
}

/// `{ "code": "0", "msg": "", "data": ... }` wrapper every endpoint uses.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(deserialize_with = "crate::models::de::string_or_number")]
    pub code: String,
    #[serde(default)]
    pub msg: String,
    #[serde(default = "none")]
    pub data: Option<T>,
}

fn none<T>() -> Option<T> {
    None
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.code == "0"
    }

    /// The payload, or [`ApiError::Upstream`] for a non-zero code.
    pub fn into_result(self) -> Result<Option<T>, ApiError> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(ApiError::Upstream {
                code: self.code,
                msg: self.msg,
            })
        }
    }
}

/// Payload that some endpoints send as a list and others as a single object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_first(self) -> Option<T> {
        match self {
            OneOrMany::Many(items) => items.into_iter().next(),
            OneOrMany::One(item) => Some(item),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Decode `data` into `T` once the envelope code has been checked.
pub(crate) fn decode_data<T: DeserializeOwned>(
    path: &str,
    data: Option<serde_json::Value>,
) -> Result<Option<T>, ApiError> {
    match data {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ApiError::Decode(format!("{}: {}", path, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_code_accepted() {
        let resp: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"code":0,"data":{"price":"1"}}"#).unwrap();
        assert!(resp.is_success());
        assert!(resp.into_result().unwrap().is_some());
    }

    #[test]
    fn test_error_code_becomes_upstream() {
        let resp: ApiResponse<serde_json::Value> =
            serde_json::from_str(r#"{"code":"50011","msg":"Too Many Requests","data":[]}"#)
                .unwrap();
        match resp.into_result() {
            Err(ApiError::Upstream { code, msg }) => {
                assert_eq!(code, "50011");
                assert_eq!(msg, "Too Many Requests");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_one_or_many() {
        let many: OneOrMany<u32> = serde_json::from_str("[1, 2]").unwrap();
        assert_eq!(many.into_first(), Some(1));
        let one: OneOrMany<u32> = serde_json::from_str("7").unwrap();
        assert_eq!(one.into_vec(), vec![7]);
    }
}
