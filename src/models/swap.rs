//! Swap request, swap transaction and swap history records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::str::FromStr;

use super::common::Slippage;
use super::quote::RouterResult;

/// Parameters for `GET /api/v5/dex/aggregator/swap`.
///
/// `amount` is in base units of the from-token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub chain_id: String,
    pub from_token_address: String,
    pub to_token_address: String,
    pub amount: String,
    pub slippage: Slippage,
    pub user_wallet_address: String,
}

impl SwapRequest {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("chainId", self.chain_id.clone()),
            ("amount", self.amount.clone()),
            ("fromTokenAddress", self.from_token_address.clone()),
            ("toTokenAddress", self.to_token_address.clone()),
            ("slippage", self.slippage.to_string()),
            ("userWalletAddress", self.user_wallet_address.clone()),
        ]
    }
}

/// Unsigned transaction produced by the aggregator.
///
/// On EVM chains `data` is hex calldata; on Solana it is a base58
/// serialized transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapTransaction {
    pub data: String,
    #[serde(rename = "from")]
    pub from_address: String,
    #[serde(default)]
    pub gas: String,
    #[serde(default)]
    pub gas_price: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_priority_fee_per_gas: Option<String>,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_receive_amount: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapInfo {
    pub router_result: RouterResult,
    pub tx: SwapTransaction,
}

/// Outcome of an executed swap: the route plus the on-chain hash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapResult {
    #[serde(flatten)]
    pub router_result: RouterResult,
    #[serde(rename = "txHash")]
    pub tx_hash: String,
}

impl SwapResult {
    pub fn new(router_result: RouterResult, tx_hash: impl Into<String>) -> Self {
        Self {
            router_result,
            tx_hash: tx_hash.into(),
        }
    }
}

impl Deref for SwapResult {
    type Target = RouterResult;

    fn deref(&self) -> &Self::Target {
        &self.router_result
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenDetails {
    pub symbol: String,
    pub amount: String,
    pub token_address: String,
}

/// A swap as recorded by the aggregator's history endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SwapHistoryData {
    pub chain_id: String,
    pub tx_hash: String,
    pub height: String,
    pub tx_time: String,
    /// `pending`, `success` or `fail`.
    pub status: String,
    pub tx_type: String,
    pub from_address: String,
    pub dex_router: String,
    pub to_address: String,
    pub from_token_details: TokenDetails,
    pub to_token_details: TokenDetails,
    pub referral_amount: String,
    pub error_msg: String,
    pub gas_limit: String,
    pub gas_used: String,
    pub gas_price: String,
    pub tx_fee: String,
}

impl SwapHistoryData {
    /// `gas_used × gas_price` in the chain's smallest fee unit.
    pub fn gas_fee(&self) -> Option<Decimal> {
        let used = Decimal::from_str(&self.gas_used).ok()?;
        let price = Decimal::from_str(&self.gas_price).ok()?;
        used.checked_mul(price)
    }
}
