//! EVM JSON-RPC client with timeout and error handling.
//!
//! # Responsibilities
//! - Connect to the configured JSON-RPC endpoint
//! - Query chain state (chain id, nonce, fees, receipts, ERC-20 state)
//! - Simulate and submit raw transactions
//! - Bound every call with the RPC timeout

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use alloy::sol;
use std::fmt::Display;
use std::future::IntoFuture;
use std::time::Duration;
use tokio::time::timeout;

use crate::chains::types::{ChainError, ChainResult};

sol! {
    #[sol(rpc)]
    interface IERC20 {
        function decimals() external view returns (uint8);
        function allowance(address owner, address spender) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}

/// JSON-RPC client for one EVM chain.
#[derive(Clone)]
pub struct EvmRpcClient {
    provider: DynProvider,
    rpc_url: String,
    timeout_duration: Duration,
}

impl EvmRpcClient {
    /// Create a client. No request is made until the first call.
    pub fn new(rpc_url: &str, rpc_timeout: Duration) -> ChainResult<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| ChainError::Rpc(format!("Invalid RPC URL '{}': {}", rpc_url, e)))?;
        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
            timeout_duration: rpc_timeout,
        })
    }

    async fn timed<T, E, F>(&self, op: &'static str, fut: F) -> ChainResult<T>
    where
        F: IntoFuture<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(op, error = %e, "RPC error");
                Err(ChainError::Rpc(format!("{}: {}", op, e)))
            }
            Err(_) => {
                tracing::warn!(op, "RPC timeout");
                Err(ChainError::Timeout(self.timeout_duration.as_secs()))
            }
        }
    }

    pub async fn get_chain_id(&self) -> ChainResult<u64> {
        self.timed("eth_chainId", self.provider.get_chain_id()).await
    }

    /// Pending-inclusive nonce for `address`.
    pub async fn get_transaction_count(&self, address: Address) -> ChainResult<u64> {
        self.timed(
            "eth_getTransactionCount",
            self.provider.get_transaction_count(address),
        )
        .await
    }

    pub async fn get_max_priority_fee(&self) -> ChainResult<u128> {
        self.timed(
            "eth_maxPriorityFeePerGas",
            self.provider.get_max_priority_fee_per_gas(),
        )
        .await
    }

    /// Base fee of the latest block; zero on chains without EIP-1559.
    pub async fn get_base_fee(&self) -> ChainResult<u128> {
        let block = self
            .timed(
                "eth_getBlockByNumber",
                self.provider.get_block_by_number(BlockNumberOrTag::Latest),
            )
            .await?
            .ok_or_else(|| ChainError::Rpc("latest block not available".to_string()))?;
        Ok(block.header.base_fee_per_gas.unwrap_or_default() as u128)
    }

    pub async fn estimate_gas(&self, tx: &TransactionRequest) -> ChainResult<u64> {
        self.timed("eth_estimateGas", self.provider.estimate_gas(tx.clone()))
            .await
    }

    pub async fn eth_call(&self, tx: &TransactionRequest) -> ChainResult<Bytes> {
        self.timed("eth_call", self.provider.call(tx.clone())).await
    }

    /// Broadcast an encoded signed transaction; returns its hash.
    pub async fn send_raw_transaction(&self, raw: &[u8]) -> ChainResult<TxHash> {
        let pending = self
            .timed(
                "eth_sendRawTransaction",
                self.provider.send_raw_transaction(raw),
            )
            .await?;
        Ok(*pending.tx_hash())
    }

    pub async fn get_transaction_receipt(
        &self,
        tx_hash: TxHash,
    ) -> ChainResult<Option<TransactionReceipt>> {
        self.timed(
            "eth_getTransactionReceipt",
            self.provider.get_transaction_receipt(tx_hash),
        )
        .await
    }

    /// ERC-20 `decimals()`.
    pub async fn erc20_decimals(&self, token: Address) -> ChainResult<u8> {
        let contract = IERC20::new(token, self.provider.clone());
        self.timed("decimals", contract.decimals().call()).await
    }

    /// ERC-20 `allowance(owner, spender)`.
    pub async fn erc20_allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> ChainResult<U256> {
        let contract = IERC20::new(token, self.provider.clone());
        self.timed("allowance", contract.allowance(owner, spender).call())
            .await
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

impl std::fmt::Debug for EvmRpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmRpcClient")
            .field("rpc_url", &self.rpc_url)
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
