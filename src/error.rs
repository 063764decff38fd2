//! Top-level error taxonomy.
//!
//! Three failure categories propagate to the caller untouched:
//! configuration/validation, upstream aggregator API, and chain submission.
//! Nothing is retried internally.

use thiserror::Error;

use crate::api::ApiError;
use crate::chains::ChainError;
use crate::config::ConfigError;

/// Errors returned by the SDK.
#[derive(Debug, Error)]
pub enum DexError {
    /// Missing or malformed settings.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The aggregator rejected the call or returned an unusable payload.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Signing, RPC or on-chain failure.
    #[error(transparent)]
    Chain(#[from] ChainError),

    /// A request argument failed validation.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No RPC URL / private key pair configured for this chain.
    #[error("Chain '{0}' is not configured in settings")]
    ChainNotConfigured(String),

    /// The chain id is known to the aggregator but has no handler here.
    #[error("Chain '{0}' is not supported yet")]
    UnsupportedChain(String),
}

impl DexError {
    /// True for configuration and input validation failures.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            DexError::Config(_) | DexError::InvalidInput(_) | DexError::ChainNotConfigured(_)
        )
    }

    /// True when the aggregator API is the source of the failure.
    pub fn is_upstream(&self) -> bool {
        matches!(self, DexError::Api(_))
    }

    /// True when the chain RPC or signing layer is the source of the failure.
    pub fn is_chain(&self) -> bool {
        matches!(self, DexError::Chain(_))
    }
}

/// Result type for SDK operations.
pub type DexResult<T> = Result<T, DexError>;
