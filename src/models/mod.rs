//! Request and response records for the aggregator API.
//!
//! Amounts stay as the decimal strings the API sends; derived values are
//! computed with `rust_decimal` on demand.

pub mod common;
pub mod quote;
pub mod swap;
pub mod wallet;

pub use common::{ApproveTransaction, BalancePercent, Chain, LiquiditySource, Slippage, Token};
pub use quote::{DexProtocol, DexRouter, QuoteCompare, QuoteRequest, RouterResult, SubRouter, TokenInfo};
pub use swap::{SwapHistoryData, SwapInfo, SwapRequest, SwapResult, SwapTransaction, TokenDetails};
pub use wallet::{
    BroadcastTransactionData, HistoricalPriceData, HistoricalPricePoint, TokenAsset,
    TokenBalanceRequestItem, TokenBalancesData, TokenPriceData, TransactionOrder,
    TransactionOrdersQuery,
};

/// Serde helpers for fields the API sends as either strings or numbers.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Int(i64),
        Float(f64),
    }

    pub fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match StringOrNumber::deserialize(deserializer)? {
            StringOrNumber::String(s) => s,
            StringOrNumber::Int(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        })
    }
}
