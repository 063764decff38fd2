//! EIP-1559 transaction building, simulation, signing and confirmation.
//!
//! # Responsibilities
//! - Fill nonce, fees and chain id from the RPC
//! - Simulate with `eth_estimateGas` + `eth_call` before sending
//! - Sign locally and broadcast the raw transaction
//! - Poll for the receipt until the confirmation timeout

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::{TransactionReceipt, TransactionRequest};
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::chains::evm::client::EvmRpcClient;
use crate::chains::evm::wallet::EvmWallet;
use crate::chains::types::{ChainError, ChainResult};

/// How `maxFeePerGas` is derived from the latest base fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeeStrategy {
    /// `5 × baseFee + priorityFee`; swaps must not stall behind base fee spikes.
    Swap,
    /// `1.2 × baseFee + priorityFee`.
    Approve,
}

impl FeeStrategy {
    pub fn max_fee_per_gas(&self, base_fee: u128, priority_fee: u128) -> u128 {
        let scaled = match self {
            FeeStrategy::Swap => base_fee.saturating_mul(5),
            FeeStrategy::Approve => base_fee.saturating_mul(12) / 10,
        };
        scaled.saturating_add(priority_fee)
    }
}

/// Aggregator gas estimate plus 50%.
pub fn buffered_gas_limit(gas: u64) -> u64 {
    gas.saturating_add(gas / 2)
}

pub fn parse_address(value: &str, field: &str) -> ChainResult<Address> {
    value
        .trim()
        .parse()
        .map_err(|e| ChainError::InvalidTransaction(format!("{} '{}': {}", field, value, e)))
}

/// Decimal or `0x` hex quantity; blank means zero.
pub fn parse_u256(value: &str, field: &str) -> ChainResult<U256> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(U256::ZERO);
    }
    value
        .parse()
        .map_err(|e| ChainError::InvalidTransaction(format!("{} '{}': {}", field, value, e)))
}

pub fn parse_gas(value: &str, field: &str) -> ChainResult<u64> {
    value
        .trim()
        .parse()
        .map_err(|e| ChainError::InvalidTransaction(format!("{} '{}': {}", field, value, e)))
}

pub fn parse_calldata(value: &str) -> ChainResult<Bytes> {
    value
        .trim()
        .parse()
        .map_err(|e| ChainError::InvalidTransaction(format!("calldata: {}", e)))
}

/// Builds, signs and tracks transactions for one wallet on one chain.
#[derive(Debug, Clone)]
pub struct TxSender {
    client: EvmRpcClient,
    wallet: EvmWallet,
    confirmation_timeout: Duration,
    poll_interval: Duration,
}

impl TxSender {
    pub fn new(client: EvmRpcClient, wallet: EvmWallet, confirmation_timeout: Duration) -> Self {
        Self {
            client,
            wallet,
            confirmation_timeout,
            poll_interval: Duration::from_secs(2),
        }
    }

    /// EIP-1559 request with nonce, fees and chain id from the RPC.
    ///
    /// Without `gas_limit` the limit comes from `eth_estimateGas`.
    pub async fn build(
        &self,
        to: Address,
        value: U256,
        data: Bytes,
        gas_limit: Option<u64>,
        fees: FeeStrategy,
    ) -> ChainResult<TransactionRequest> {
        let from = self.wallet.address();
        let nonce = self.client.get_transaction_count(from).await?;
        let priority_fee = self.client.get_max_priority_fee().await?;
        let base_fee = self.client.get_base_fee().await?;
        let chain_id = self.client.get_chain_id().await?;
        let max_fee = fees.max_fee_per_gas(base_fee, priority_fee);

        let tx = TransactionRequest::default()
            .with_from(from)
            .with_to(to)
            .with_value(value)
            .with_input(data)
            .with_nonce(nonce)
            .with_chain_id(chain_id)
            .with_max_priority_fee_per_gas(priority_fee)
            .with_max_fee_per_gas(max_fee);

        let gas_limit = match gas_limit {
            Some(gas) => gas,
            None => self
                .client
                .estimate_gas(&tx)
                .await
                .map_err(|e| ChainError::Simulation(e.to_string()))?,
        };

        tracing::debug!(
            to = %to,
            nonce,
            chain_id,
            gas_limit,
            max_fee_per_gas = max_fee,
            max_priority_fee_per_gas = priority_fee,
            "Built EIP-1559 transaction"
        );

        Ok(tx.with_gas_limit(gas_limit))
    }

    /// Dry-run the transaction; returns the node's gas estimate.
    pub async fn simulate(&self, tx: &TransactionRequest) -> ChainResult<u64> {
        let estimated = self
            .client
            .estimate_gas(tx)
            .await
            .map_err(|e| ChainError::Simulation(e.to_string()))?;

        if tx.input.input().is_some_and(|d| !d.is_empty()) {
            self.client
                .eth_call(tx)
                .await
                .map_err(|e| ChainError::Simulation(e.to_string()))?;
        }

        tracing::info!(estimated_gas = estimated, "Transaction simulation succeeded");
        Ok(estimated)
    }

    pub async fn sign_and_send(&self, tx: TransactionRequest) -> ChainResult<TxHash> {
        let raw = self.wallet.sign_transaction(tx).await?;
        let tx_hash = self.client.send_raw_transaction(&raw).await?;
        tracing::info!(tx_hash = %tx_hash, "Transaction sent");
        Ok(tx_hash)
    }

    /// Wait for the receipt; a failed status is [`ChainError::Reverted`].
    pub async fn wait_for_receipt(&self, tx_hash: TxHash) -> ChainResult<TransactionReceipt> {
        let result = timeout(self.confirmation_timeout, async {
            let mut ticker = interval(self.poll_interval);

            loop {
                ticker.tick().await;

                let receipt = match self.client.get_transaction_receipt(tx_hash).await? {
                    Some(r) => r,
                    None => {
                        tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        continue;
                    }
                };

                if !receipt.status() {
                    return Err(ChainError::Reverted(tx_hash.to_string()));
                }

                tracing::info!(
                    tx_hash = %tx_hash,
                    block_number = receipt.block_number,
                    gas_used = receipt.gas_used,
                    "Transaction confirmed"
                );
                return Ok(receipt);
            }
        })
        .await;

        match result {
            Ok(receipt) => receipt,
            Err(_) => Err(ChainError::ConfirmationTimeout {
                tx_hash: tx_hash.to_string(),
                secs: self.confirmation_timeout.as_secs(),
            }),
        }
    }

    pub fn client(&self) -> &EvmRpcClient {
        &self.client
    }

    pub fn wallet(&self) -> &EvmWallet {
        &self.wallet
    }
}
