//! Wallet balances, prices and broadcast orders.

use serde::{Deserialize, Serialize};

/// One `(chain, token)` pair in a balance query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalanceRequestItem {
    pub chain_index: String,
    pub token_contract_address: String,
}

impl TokenBalanceRequestItem {
    pub fn new(chain_index: impl Into<String>, token_contract_address: impl Into<String>) -> Self {
        Self {
            chain_index: chain_index.into(),
            token_contract_address: token_contract_address.into(),
        }
    }
}

/// Balance of one token held by an address.
///
/// `balance` is in whole tokens; `raw_balance` (when sent) in base units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenAsset {
    pub chain_index: String,
    pub token_contract_address: String,
    #[serde(default)]
    pub symbol: String,
    pub balance: String,
    #[serde(default)]
    pub token_price: String,
    #[serde(default)]
    pub is_risk_token: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_balance: Option<String>,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalancesData {
    #[serde(default)]
    pub token_assets: Vec<TokenAsset>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastTransactionData {
    pub order_id: String,
}

/// A transaction submitted through the broadcast endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionOrder {
    pub chain_index: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    pub order_id: String,
    pub tx_status: String,
    #[serde(default)]
    pub tx_hash: String,
}

/// Filters for `GET /api/v5/wallet/post-transaction/orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionOrdersQuery {
    pub address: Option<String>,
    pub account_id: Option<String>,
    pub chain_index: Option<String>,
    pub tx_status: Option<String>,
    pub order_id: Option<String>,
    pub cursor: Option<String>,
    pub limit: Option<u32>,
}

impl TransactionOrdersQuery {
    /// Only the filters that are set, in a fixed order.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let fields = [
            ("address", self.address.clone()),
            ("accountId", self.account_id.clone()),
            ("chainIndex", self.chain_index.clone()),
            ("txStatus", self.tx_status.clone()),
            ("orderId", self.order_id.clone()),
            ("cursor", self.cursor.clone()),
            ("limit", self.limit.map(|l| l.to_string())),
        ];
        fields
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect()
    }
}

/// Latest USD price of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPriceData {
    pub chain_index: String,
    pub token_contract_address: String,
    #[serde(default)]
    pub time: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPricePoint {
    #[serde(default)]
    pub time: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoricalPriceData {
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub prices: Vec<HistoricalPricePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orders_query_skips_unset_filters() {
        let query = TransactionOrdersQuery {
            address: Some("0xabc".into()),
            chain_index: Some("1".into()),
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(
            query.to_params(),
            vec![
                ("address", "0xabc".to_string()),
                ("chainIndex", "1".to_string()),
                ("limit", "20".to_string()),
            ]
        );
    }

    #[test]
    fn test_balance_request_item_wire_names() {
        let item = TokenBalanceRequestItem::new("56", "0x55d398326f99059ff775485246999027b3197955");
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["chainIndex"], "56");
        assert!(json.get("tokenContractAddress").is_some());
    }
}
