//! Chain/token listings and validated request values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DexError;

/// A chain supported for single-chain swaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    #[serde(deserialize_with = "super::de::string_or_number")]
    pub chain_id: String,
    pub chain_name: String,
    /// Spender that ERC-20 approvals must target on this chain.
    #[serde(default)]
    pub dex_token_approve_address: String,
}

/// A token tradable through the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    #[serde(deserialize_with = "super::de::string_or_number")]
    pub decimals: String,
    pub token_contract_address: String,
    #[serde(default)]
    pub token_logo_url: String,
    #[serde(default)]
    pub token_name: String,
    pub token_symbol: String,
}

impl Token {
    pub fn decimals(&self) -> Option<u8> {
        self.decimals.parse().ok()
    }
}

/// A liquidity venue the aggregator routes through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquiditySource {
    pub id: String,
    #[serde(default)]
    pub logo: String,
    pub name: String,
}

/// Approval calldata produced by the aggregator for an EVM token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveTransaction {
    pub data: String,
    pub dex_contract_address: String,
    pub gas_limit: String,
    pub gas_price: String,
}

fn unit_interval(value: Decimal, what: &str) -> Result<Decimal, DexError> {
    if value <= Decimal::ZERO || value > Decimal::ONE {
        return Err(DexError::InvalidInput(format!(
            "{} must be in (0, 1], got {}",
            what, value
        )));
    }
    Ok(value.normalize())
}

/// Maximum tolerated price deviation, as a fraction (`0.01` = 1%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Slippage(Decimal);

impl Slippage {
    pub fn new(value: Decimal) -> Result<Self, DexError> {
        unit_interval(value, "slippage").map(Self)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for Slippage {
    type Error = DexError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Slippage> for Decimal {
    fn from(value: Slippage) -> Self {
        value.0
    }
}

impl FromStr for Slippage {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| DexError::InvalidInput(format!("slippage '{}': {}", s, e)))?;
        Self::new(value)
    }
}

impl fmt::Display for Slippage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fraction of the wallet balance to swap (`0.5` = half, `1` = all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct BalancePercent(Decimal);

impl BalancePercent {
    pub fn new(value: Decimal) -> Result<Self, DexError> {
        unit_interval(value, "balance percent").map(Self)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl TryFrom<Decimal> for BalancePercent {
    type Error = DexError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BalancePercent> for Decimal {
    fn from(value: BalancePercent) -> Self {
        value.0
    }
}

impl FromStr for BalancePercent {
    type Err = DexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|e| DexError::InvalidInput(format!("balance percent '{}': {}", s, e)))?;
        Self::new(value)
    }
}

impl fmt::Display for BalancePercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
