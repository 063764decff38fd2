//! Chain integration subsystem.
//!
//! # Data Flow
//! ```text
//! ChainSettings (RPC URL, private key)
//!     → wallet (key loading, address)
//!     → aggregator swap / approve-transaction (unsigned tx data)
//!     → sign locally with the chain SDK
//!     → submit to the chain RPC, wait for confirmation
//!     → SwapResult / tx hash
//! ```
//!
//! # Security Constraints
//! - Private keys only come from [`ChainSettings`]
//! - Never log private keys or signed payloads
//! - All RPC calls have configurable timeouts

pub mod evm;
pub mod solana;
pub mod sui;
pub mod types;

use alloy::primitives::U256;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::api::OkxDexApi;
use crate::config::{ChainSettings, Settings};
use crate::constants::ChainType;
use crate::error::DexResult;
use crate::models::{SwapRequest, SwapResult};

pub use evm::EvmChain;
pub use solana::SolanaChain;
pub use sui::SuiChain;
pub use types::{ChainError, ChainResult};

/// Signs and submits aggregator transactions on one chain family.
#[async_trait]
pub trait ChainHandler: Send + Sync {
    fn chain_type(&self) -> ChainType;

    /// Address derived from the configured private key.
    fn wallet_address(&self) -> DexResult<String>;

    /// Decimals of `token_address`, native currency included.
    async fn token_decimals(&self, token_address: &str) -> DexResult<u8>;

    /// Fetch swap data for `request`, sign, submit and wait for confirmation.
    async fn execute_swap(&self, request: &SwapRequest) -> DexResult<SwapResult>;

    /// Approve the aggregator to spend `amount` base units of `token_address`.
    /// Returns the transaction hash.
    async fn approve(&self, chain_id: &str, token_address: &str, amount: U256) -> DexResult<String>;
}

/// Timeouts shared by the chain handlers.
#[derive(Debug, Clone, Copy)]
pub struct ChainTimeouts {
    pub rpc: Duration,
    pub confirmation: Duration,
}

impl ChainTimeouts {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            rpc: Duration::from_secs(settings.rpc_timeout_secs),
            confirmation: Duration::from_secs(settings.confirmation_timeout_secs),
        }
    }
}

/// Build the handler for `chain_type` from its settings.
pub fn create_handler(
    chain_type: ChainType,
    api: OkxDexApi,
    chain: &ChainSettings,
    timeouts: ChainTimeouts,
) -> DexResult<Arc<dyn ChainHandler>> {
    let handler: Arc<dyn ChainHandler> = match chain_type {
        ChainType::Evm => Arc::new(EvmChain::new(api, chain, timeouts)?),
        ChainType::Solana => Arc::new(SolanaChain::new(api, chain, timeouts)?),
        ChainType::Sui => Arc::new(SuiChain::new(chain)),
    };
    Ok(handler)
}
