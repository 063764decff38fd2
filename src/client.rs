//! High-level SDK entry point.
//!
//! # Responsibilities
//! - Own the signed REST client and the validated settings
//! - Create chain handlers on first use and cache them per chain id
//! - Scale human-readable amounts to base units using cached token decimals
//! - Resolve balance-percent swaps to an absolute amount before executing
//!
//! # Data Flow
//! ```text
//! get_quote / execute_swap (human amount)
//!     → token decimals (cache, else chain handler)
//!     → base units
//!     → OkxDexApi::quote / ChainHandler::execute_swap
//!
//! execute_swap_via_balance_percent (percent)
//!     → OKX token balance → truncate + scale + percent
//!     → same fixed-amount swap path
//! ```

use alloy::primitives::U256;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::str::FromStr;
use std::sync::Arc;

use crate::api::{ApiError, OkxDexApi};
use crate::chains::{create_handler, ChainHandler, ChainTimeouts};
use crate::config::Settings;
use crate::constants::{endpoints, ChainId};
use crate::error::{DexError, DexResult};
use crate::models::{
    BalancePercent, Chain, LiquiditySource, QuoteRequest, RouterResult, Slippage,
    SwapHistoryData, SwapRequest, SwapResult, Token, TokenBalanceRequestItem, TokenBalancesData,
    TokenPriceData, TransactionOrder, TransactionOrdersQuery,
};
use crate::utils::{balance_percent_amount, to_base_units};

/// OKX DEX aggregator client.
pub struct OkxDexClient {
    settings: Settings,
    api: OkxDexApi,
    handlers: DashMap<String, Arc<dyn ChainHandler>>,
    decimals: DashMap<(String, String), u8>,
}

impl OkxDexClient {
    /// Build a client from validated settings.
    pub fn new(settings: Settings) -> DexResult<Self> {
        let api = OkxDexApi::from_settings(&settings)?;
        Ok(Self::with_api(settings, api))
    }

    /// Build a client around an existing REST client.
    pub fn with_api(settings: Settings, api: OkxDexApi) -> Self {
        tracing::info!(
            base_url = %api.base_url(),
            chains = ?settings.chain_ids().collect::<Vec<_>>(),
            "OKX DEX client created"
        );
        Self {
            settings,
            api,
            handlers: DashMap::new(),
            decimals: DashMap::new(),
        }
    }

    /// Use `handler` for `chain_id` instead of creating one from settings.
    pub fn register_handler(&self, chain_id: &str, handler: Arc<dyn ChainHandler>) {
        self.handlers.insert(chain_id.to_string(), handler);
    }

    /// The underlying REST client.
    pub fn api(&self) -> &OkxDexApi {
        &self.api
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Cached handler for `chain_id`, created on first use.
    pub fn chain_handler(&self, chain_id: &str) -> DexResult<Arc<dyn ChainHandler>> {
        if let Some(handler) = self.handlers.get(chain_id) {
            return Ok(handler.clone());
        }

        let chain_settings = self
            .settings
            .chain(chain_id)
            .ok_or_else(|| DexError::ChainNotConfigured(chain_id.to_string()))?;
        let chain_type = ChainId::from_str(chain_id)
            .ok()
            .and_then(|id| id.chain_type())
            .ok_or_else(|| DexError::UnsupportedChain(chain_id.to_string()))?;

        let handler = create_handler(
            chain_type,
            self.api.clone(),
            chain_settings,
            ChainTimeouts::from_settings(&self.settings),
        )?;

        tracing::debug!(chain_id, chain_type = %chain_type, "Chain handler created");
        Ok(self
            .handlers
            .entry(chain_id.to_string())
            .or_insert(handler)
            .clone())
    }

    /// Address of the configured wallet on `chain_id`.
    pub fn wallet_address(&self, chain_id: &str) -> DexResult<String> {
        self.chain_handler(chain_id)?.wallet_address()
    }

    pub async fn get_supported_chains(&self) -> DexResult<Vec<Chain>> {
        Ok(self.api.supported_chains().await?)
    }

    pub async fn get_tokens(&self, chain_id: &str) -> DexResult<Vec<Token>> {
        Ok(self.api.tokens(chain_id).await?)
    }

    pub async fn get_liquidity_sources(&self, chain_id: &str) -> DexResult<Vec<LiquiditySource>> {
        Ok(self.api.liquidity_sources(chain_id).await?)
    }

    /// Decimals of a token, memoised per chain and token.
    pub async fn get_token_decimals(&self, chain_id: &str, token_address: &str) -> DexResult<u8> {
        let key = decimals_key(chain_id, token_address);
        if let Some(decimals) = self.decimals.get(&key) {
            tracing::debug!(chain_id, token = %token_address, decimals = *decimals, "Token decimals cache hit");
            return Ok(*decimals);
        }

        let decimals = self
            .chain_handler(chain_id)?
            .token_decimals(token_address)
            .await?;
        self.decimals.insert(key, decimals);
        Ok(decimals)
    }

    /// Quote for a human-readable `amount` of the from-token.
    pub async fn get_quote(
        &self,
        chain_id: &str,
        from_token_address: &str,
        to_token_address: &str,
        amount: &str,
        fee_percent: Option<&str>,
    ) -> DexResult<RouterResult> {
        let raw_amount = self.scale_amount(chain_id, from_token_address, amount).await?;
        let request = QuoteRequest {
            chain_id: chain_id.to_string(),
            from_token_address: from_token_address.to_string(),
            to_token_address: to_token_address.to_string(),
            amount: raw_amount.to_string(),
            fee_percent: fee_percent.map(str::to_string),
        };
        Ok(self.api.quote(&request).await?)
    }

    /// Swap a human-readable `amount` of the from-token.
    pub async fn execute_swap(
        &self,
        chain_id: &str,
        from_token_address: &str,
        to_token_address: &str,
        amount: &str,
        slippage: Slippage,
        user_wallet_address: &str,
    ) -> DexResult<SwapResult> {
        let raw_amount = self.scale_amount(chain_id, from_token_address, amount).await?;
        self.swap_raw_amount(
            chain_id,
            from_token_address,
            to_token_address,
            raw_amount,
            slippage,
            user_wallet_address,
        )
        .await
    }

    /// Swap `percent` of the wallet's current from-token balance.
    pub async fn execute_swap_via_balance_percent(
        &self,
        chain_id: &str,
        from_token_address: &str,
        to_token_address: &str,
        percent: BalancePercent,
        slippage: Slippage,
        user_wallet_address: &str,
    ) -> DexResult<SwapResult> {
        let balances = self
            .get_token_balance(
                chain_id,
                user_wallet_address,
                &[from_token_address.to_string()],
            )
            .await?;
        let balance = balances
            .into_iter()
            .next()
            .and_then(|data| data.token_assets.into_iter().next())
            .map(|asset| asset.balance)
            .ok_or_else(|| ApiError::EmptyData(endpoints::TOKEN_BALANCES.to_string()))?;

        let decimals = self.get_token_decimals(chain_id, from_token_address).await?;
        let raw_amount = balance_percent_amount(&balance, decimals, percent)?;

        tracing::info!(
            chain_id,
            token = %from_token_address,
            balance = %balance,
            percent = %percent,
            raw_amount = %raw_amount,
            "Resolved balance percent to swap amount"
        );

        self.swap_raw_amount(
            chain_id,
            from_token_address,
            to_token_address,
            raw_amount,
            slippage,
            user_wallet_address,
        )
        .await
    }

    /// Approve the aggregator to spend `amount` base units; returns the tx hash.
    pub async fn approve(
        &self,
        chain_id: &str,
        token_address: &str,
        amount: &str,
    ) -> DexResult<String> {
        let amount = U256::from_str_radix(amount.trim(), 10)
            .map_err(|e| DexError::InvalidInput(format!("approve amount '{}': {}", amount, e)))?;
        self.chain_handler(chain_id)?
            .approve(chain_id, token_address, amount)
            .await
    }

    /// Balances of specific tokens on `chain_id` held by `user_wallet_address`.
    pub async fn get_token_balance(
        &self,
        chain_id: &str,
        user_wallet_address: &str,
        token_addresses: &[String],
    ) -> DexResult<Vec<TokenBalancesData>> {
        let tokens: Vec<_> = token_addresses
            .iter()
            .map(|token| TokenBalanceRequestItem::new(chain_id, token.as_str()))
            .collect();
        Ok(self
            .api
            .token_balances(user_wallet_address, &tokens, true)
            .await?)
    }

    /// Every token balance of `user_wallet_address` across `chains`.
    pub async fn get_all_token_balances(
        &self,
        chains: &[String],
        user_wallet_address: &str,
    ) -> DexResult<Vec<TokenBalancesData>> {
        Ok(self
            .api
            .all_token_balances(user_wallet_address, chains, true)
            .await?)
    }

    pub async fn get_token_price(
        &self,
        chain_id: &str,
        token_address: &str,
    ) -> DexResult<TokenPriceData> {
        Ok(self.api.token_price(chain_id, token_address).await?)
    }

    /// Daily close price on `date`; `None` when the aggregator has no data.
    pub async fn get_historical_price(
        &self,
        chain_id: &str,
        token_address: &str,
        date: NaiveDate,
    ) -> DexResult<Option<String>> {
        Ok(self
            .api
            .historical_price(chain_id, token_address, date)
            .await?)
    }

    pub async fn get_swap_history(
        &self,
        chain_id: &str,
        tx_hash: &str,
        is_from_my_project: bool,
    ) -> DexResult<Option<SwapHistoryData>> {
        Ok(self
            .api
            .swap_history(chain_id, tx_hash, is_from_my_project)
            .await?)
    }

    pub async fn get_transaction_orders(
        &self,
        query: &TransactionOrdersQuery,
    ) -> DexResult<Vec<TransactionOrder>> {
        Ok(self.api.transaction_orders(query).await?)
    }

    async fn scale_amount(&self, chain_id: &str, token_address: &str, amount: &str) -> DexResult<U256> {
        let decimals = self.get_token_decimals(chain_id, token_address).await?;
        let raw = to_base_units(amount, decimals)?;
        tracing::debug!(chain_id, amount, decimals, raw_amount = %raw, "Scaled amount to base units");
        Ok(raw)
    }

    async fn swap_raw_amount(
        &self,
        chain_id: &str,
        from_token_address: &str,
        to_token_address: &str,
        raw_amount: U256,
        slippage: Slippage,
        user_wallet_address: &str,
    ) -> DexResult<SwapResult> {
        if raw_amount.is_zero() {
            return Err(DexError::InvalidInput("swap amount must be positive".to_string()));
        }
        require_non_empty("from token address", from_token_address)?;
        require_non_empty("to token address", to_token_address)?;
        require_non_empty("user wallet address", user_wallet_address)?;

        let handler = self.chain_handler(chain_id)?;
        let request = SwapRequest {
            chain_id: chain_id.to_string(),
            from_token_address: from_token_address.to_string(),
            to_token_address: to_token_address.to_string(),
            amount: raw_amount.to_string(),
            slippage,
            user_wallet_address: user_wallet_address.to_string(),
        };
        handler.execute_swap(&request).await
    }
}

impl std::fmt::Debug for OkxDexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OkxDexClient")
            .field("api", &self.api)
            .field("handlers", &self.handlers.len())
            .finish()
    }
}

/// EVM addresses are case-insensitive; base58 addresses are not.
fn decimals_key(chain_id: &str, token_address: &str) -> (String, String) {
    let token = token_address.trim();
    let token = if token.starts_with("0x") || token.starts_with("0X") {
        token.to_ascii_lowercase()
    } else {
        token.to_string()
    };
    (chain_id.to_string(), token)
}

fn require_non_empty(field: &str, value: &str) -> DexResult<()> {
    if value.trim().is_empty() {
        return Err(DexError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}
