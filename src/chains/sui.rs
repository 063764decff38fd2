//! Sui chain handler.
//!
//! Sui is a recognized chain family but transaction signing is not supported
//! yet. Every operation fails with [`ChainError::Unsupported`], so callers get a
//! typed error instead of a half-built transaction.

use alloy::primitives::U256;
use async_trait::async_trait;

use crate::chains::types::ChainError;
use crate::chains::ChainHandler;
use crate::config::ChainSettings;
use crate::constants::ChainType;
use crate::error::DexResult;
use crate::models::{SwapRequest, SwapResult};

#[derive(Debug, Clone)]
pub struct SuiChain {
    rpc_url: String,
}

impl SuiChain {
    pub fn new(settings: &ChainSettings) -> Self {
        tracing::warn!(rpc_url = %settings.rpc_url, "Sui handler created; swaps are not supported");
        Self {
            rpc_url: settings.rpc_url.clone(),
        }
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    fn unsupported(op: &str) -> ChainError {
        ChainError::Unsupported(format!("{} is not supported on Sui", op))
    }
}

#[async_trait]
impl ChainHandler for SuiChain {
    fn chain_type(&self) -> ChainType {
        ChainType::Sui
    }

    fn wallet_address(&self) -> DexResult<String> {
        Err(Self::unsupported("wallet address derivation").into())
    }

    async fn token_decimals(&self, _token_address: &str) -> DexResult<u8> {
        Err(Self::unsupported("token decimals lookup").into())
    }

    async fn execute_swap(&self, _request: &SwapRequest) -> DexResult<SwapResult> {
        Err(Self::unsupported("swap execution").into())
    }

    async fn approve(&self, _chain_id: &str, _token_address: &str, _amount: U256) -> DexResult<String> {
        Err(Self::unsupported("token approval").into())
    }
}
