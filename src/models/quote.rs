//! Quote request and routing result.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use crate::utils::from_base_units;

/// Parameters for `GET /api/v5/dex/aggregator/quote`.
///
/// `amount` is in base units of the from-token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    pub chain_id: String,
    pub from_token_address: String,
    pub to_token_address: String,
    pub amount: String,
    pub fee_percent: Option<String>,
}

impl QuoteRequest {
    /// Query parameters in the order the API documents them.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("chainId", self.chain_id.clone()),
            ("amount", self.amount.clone()),
            ("fromTokenAddress", self.from_token_address.clone()),
            ("toTokenAddress", self.to_token_address.clone()),
        ];
        if let Some(fee) = &self.fee_percent {
            params.push(("feePercent", fee.clone()));
        }
        params
    }
}

/// Token metadata embedded in a routing result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    #[serde(deserialize_with = "super::de::string_or_number")]
    pub decimal: String,
    #[serde(default)]
    pub is_honey_pot: bool,
    #[serde(default)]
    pub tax_rate: String,
    pub token_contract_address: String,
    pub token_symbol: String,
    #[serde(default)]
    pub token_unit_price: String,
}

impl TokenInfo {
    /// Unit price in USD.
    pub fn price(&self) -> Option<Decimal> {
        Decimal::from_str(&self.token_unit_price).ok()
    }

    pub fn decimals(&self) -> Option<u32> {
        self.decimal.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexProtocol {
    pub dex_name: String,
    pub percent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubRouter {
    pub dex_protocol: Vec<DexProtocol>,
    pub from_token: TokenInfo,
    pub to_token: TokenInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DexRouter {
    pub router: String,
    pub router_percent: String,
    pub sub_router_list: Vec<SubRouter>,
}

/// Output a single venue would have produced for the same input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteCompare {
    pub amount_out: String,
    #[serde(default)]
    pub dex_logo: String,
    pub dex_name: String,
    #[serde(default)]
    pub trade_fee: String,
}

impl QuoteCompare {
    pub fn output_amount(&self) -> Option<Decimal> {
        Decimal::from_str(&self.amount_out).ok()
    }

    /// Input per unit of output; lower is better. `None` when the venue
    /// returns nothing.
    pub fn price(&self, input_amount: Decimal) -> Option<Decimal> {
        if input_amount.is_zero() {
            return Some(Decimal::ZERO);
        }
        let output = self.output_amount()?;
        input_amount.checked_div(output)
    }
}

/// Routing result returned by `quote` and embedded in `swap`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterResult {
    #[serde(deserialize_with = "super::de::string_or_number")]
    pub chain_id: String,
    #[serde(default)]
    pub dex_router_list: Vec<DexRouter>,
    #[serde(default)]
    pub estimate_gas_fee: String,
    pub from_token: TokenInfo,
    pub from_token_amount: String,
    #[serde(
        rename = "priceImpactPercentage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub price_impact_pct: Option<String>,
    #[serde(default)]
    pub quote_compare_list: Vec<QuoteCompare>,
    pub to_token: TokenInfo,
    pub to_token_amount: String,
    #[serde(default)]
    pub trade_fee: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_to_token_amount: Option<String>,
}

impl RouterResult {
    pub fn from_amount_decimal(&self) -> Option<Decimal> {
        from_base_units(&self.from_token_amount, self.from_token.decimals()?)
    }

    pub fn to_amount_decimal(&self) -> Option<Decimal> {
        from_base_units(&self.to_token_amount, self.to_token.decimals()?)
    }

    /// Output per unit of input.
    pub fn execution_price(&self) -> Option<Decimal> {
        let to = self.to_amount_decimal()?;
        if to.is_zero() {
            return Some(Decimal::ZERO);
        }
        to.checked_div(self.from_amount_decimal()?)
    }

    pub fn value_in_usd(&self) -> Option<Decimal> {
        self.from_amount_decimal()?
            .checked_mul(self.from_token.price()?)
    }

    pub fn price_impact(&self) -> Option<Decimal> {
        self.price_impact_pct
            .as_deref()
            .filter(|s| !s.is_empty())
            .and_then(|s| Decimal::from_str(s).ok())
    }

    /// Venue name → price (input per output).
    pub fn venue_prices(&self) -> BTreeMap<String, Decimal> {
        let Some(input) = self.from_amount_decimal() else {
            return BTreeMap::new();
        };
        self.quote_compare_list
            .iter()
            .filter_map(|q| Some((q.dex_name.clone(), q.price(input)?)))
            .collect()
    }

    /// Venue with the lowest input-per-output price.
    pub fn best_venue(&self) -> Option<&QuoteCompare> {
        let input = self.from_amount_decimal()?;
        self.quote_compare_list
            .iter()
            .filter_map(|q| Some((q, q.price(input)?)))
            .min_by(|a, b| a.1.cmp(&b.1))
            .map(|(q, _)| q)
    }

    /// Human-readable venue comparison, best first.
    pub fn price_comparison(&self) -> String {
        let mut prices: Vec<_> = self.venue_prices().into_iter().collect();
        let Some(best) = prices.iter().map(|(_, p)| *p).min() else {
            return "No prices available".to_string();
        };
        prices.sort_by(|a, b| a.1.cmp(&b.1));

        let mut out = format!(
            "Best price: {:.8} {}/{}\nPrices by venue:\n",
            best, self.from_token.token_symbol, self.to_token.token_symbol
        );
        for (venue, price) in prices {
            let diff = if best.is_zero() {
                Decimal::ZERO
            } else {
                (price / best - Decimal::ONE) * Decimal::ONE_HUNDRED
            };
            let _ = writeln!(out, "  {}: {:.8} ({:+.2}%)", venue, price, diff);
        }
        out
    }
}
