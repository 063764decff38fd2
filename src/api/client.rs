//! Signed REST client for the OKX DEX endpoints.
//!
//! # Responsibilities
//! - Build the request path (path + url-encoded query) and sign it
//! - Send with the configured timeout and optional proxy
//! - Map non-2xx statuses, error codes and malformed bodies onto [`ApiError`]
//! - Decode each endpoint's `data` into typed models

use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;

use crate::api::auth::{self, Credentials};
use crate::api::types::{decode_data, ApiError, ApiResponse, OneOrMany};
use crate::config::Settings;
use crate::constants::endpoints;
use crate::models::{
    ApproveTransaction, BroadcastTransactionData, Chain, HistoricalPriceData, LiquiditySource,
    QuoteRequest, RouterResult, SwapHistoryData, SwapInfo, SwapRequest, Token,
    TokenBalanceRequestItem, TokenBalancesData, TokenPriceData, TransactionOrder,
    TransactionOrdersQuery,
};

/// OKX DEX REST client.
#[derive(Clone)]
pub struct OkxDexApi {
    http: reqwest::Client,
    credentials: Credentials,
    base_url: String,
}

impl OkxDexApi {
    /// Create a client.
    ///
    /// Without `http_proxy` no proxy is used, regardless of the process
    /// environment.
    pub fn new(
        credentials: Credentials,
        base_url: &str,
        http_proxy: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().timeout(timeout);
        builder = match http_proxy {
            Some(proxy) => builder.proxy(
                reqwest::Proxy::all(proxy)
                    .map_err(|e| ApiError::Build(format!("proxy '{}': {}", proxy, e)))?,
            ),
            None => builder.no_proxy(),
        };
        let http = builder.build().map_err(|e| ApiError::Build(e.to_string()))?;

        Ok(Self {
            http,
            credentials,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Self::new(
            Credentials::from_settings(settings),
            &settings.base_url,
            settings.http_proxy.as_deref(),
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `/path?k=v&...` with form encoding, parameters in the given order.
    pub fn request_path(path: &str, params: &[(&str, String)]) -> String {
        let mut request_path = format!("/{}", path.trim_start_matches('/'));
        if !params.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
                .finish();
            request_path.push('?');
            request_path.push_str(&query);
        }
        request_path
    }

    /// Signed GET; returns the envelope's `data`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>, ApiError> {
        let request_path = Self::request_path(path, params);
        self.send(Method::GET, &request_path, String::new()).await
    }

    /// Signed POST with a JSON body; returns the envelope's `data`.
    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, ApiError> {
        let request_path = Self::request_path(path, &[]);
        let body = serde_json::to_string(body).map_err(|e| ApiError::Decode(e.to_string()))?;
        self.send(Method::POST, &request_path, body).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        request_path: &str,
        body: String,
    ) -> Result<Option<T>, ApiError> {
        let headers =
            self.credentials
                .headers(method.as_str(), request_path, &body, &auth::timestamp())?;
        let url = format!("{}{}", self.base_url, request_path);

        tracing::debug!(method = %method, path = %request_path, "Sending OKX request");

        let mut request = self.http.request(method.clone(), &url).headers(headers);
        if method == Method::POST {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(method = %method, path = %request_path, error = %e, "OKX request failed");
                return Err(ApiError::Transport(e.to_string()));
            }
        };

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                method = %method,
                path = %request_path,
                status = status.as_u16(),
                "OKX returned error status"
            );
            return Err(ApiError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ApiResponse<serde_json::Value> = serde_json::from_str(&text)
            .map_err(|e| ApiError::Decode(format!("{}: {}", request_path, e)))?;

        let data = envelope.into_result().inspect_err(|e| {
            tracing::warn!(method = %method, path = %request_path, error = %e, "OKX rejected request");
        })?;

        decode_data(request_path, data)
    }

    async fn get_list<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        Ok(self
            .get::<OneOrMany<T>>(path, params)
            .await?
            .map(OneOrMany::into_vec)
            .unwrap_or_default())
    }

    async fn get_first<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        self.get::<OneOrMany<T>>(path, params)
            .await?
            .and_then(OneOrMany::into_first)
            .ok_or_else(|| ApiError::EmptyData(path.to_string()))
    }

    /// Chains that support single-chain swaps.
    pub async fn supported_chains(&self) -> Result<Vec<Chain>, ApiError> {
        self.get_list(endpoints::SUPPORTED_CHAINS, &[]).await
    }

    /// Tokens tradable on `chain_id`.
    pub async fn tokens(&self, chain_id: &str) -> Result<Vec<Token>, ApiError> {
        self.get_list(endpoints::ALL_TOKENS, &[("chainId", chain_id.to_string())])
            .await
    }

    pub async fn liquidity_sources(&self, chain_id: &str) -> Result<Vec<LiquiditySource>, ApiError> {
        self.get_list(endpoints::GET_LIQUIDITY, &[("chainId", chain_id.to_string())])
            .await
    }

    /// Approval calldata for `amount` base units of `token` on an EVM chain.
    pub async fn approve_transaction(
        &self,
        chain_id: &str,
        token_contract_address: &str,
        approve_amount: &str,
    ) -> Result<ApproveTransaction, ApiError> {
        self.get_first(
            endpoints::APPROVE_TRANSACTION,
            &[
                ("chainId", chain_id.to_string()),
                ("tokenContractAddress", token_contract_address.to_string()),
                ("approveAmount", approve_amount.to_string()),
            ],
        )
        .await
    }

    pub async fn quote(&self, request: &QuoteRequest) -> Result<RouterResult, ApiError> {
        self.get_first(endpoints::QUOTE, &request.to_params()).await
    }

    /// Route plus the unsigned transaction for a swap.
    pub async fn swap(&self, request: &SwapRequest) -> Result<SwapInfo, ApiError> {
        self.get_first(endpoints::SWAP, &request.to_params()).await
    }

    /// Status of a swap by hash; `None` when the aggregator has no record.
    pub async fn swap_history(
        &self,
        chain_id: &str,
        tx_hash: &str,
        is_from_my_project: bool,
    ) -> Result<Option<SwapHistoryData>, ApiError> {
        let params = [
            ("chainId", chain_id.to_string()),
            ("txHash", tx_hash.to_string()),
            ("isFromMyProject", is_from_my_project.to_string()),
        ];
        Ok(self
            .get::<OneOrMany<SwapHistoryData>>(endpoints::SWAP_HISTORY, &params)
            .await?
            .and_then(OneOrMany::into_first))
    }

    /// Balances of specific tokens held by `address`.
    pub async fn token_balances(
        &self,
        address: &str,
        tokens: &[TokenBalanceRequestItem],
        exclude_risk_token: bool,
    ) -> Result<Vec<TokenBalancesData>, ApiError> {
        let mut body = json!({
            "address": address,
            "tokenContractAddresses": tokens,
        });
        if !exclude_risk_token {
            body["excludeRiskToken"] = json!("1");
        }
        Ok(self
            .post::<OneOrMany<TokenBalancesData>, _>(endpoints::TOKEN_BALANCES, &body)
            .await?
            .map(OneOrMany::into_vec)
            .unwrap_or_default())
    }

    /// All token balances of `address` across `chains`.
    pub async fn all_token_balances(
        &self,
        address: &str,
        chains: &[String],
        exclude_risk_token: bool,
    ) -> Result<Vec<TokenBalancesData>, ApiError> {
        let mut params = vec![
            ("address", address.to_string()),
            ("chains", chains.join(",")),
        ];
        if !exclude_risk_token {
            params.push(("excludeRiskToken", "1".to_string()));
        }
        self.get_list(endpoints::ALL_TOKEN_BALANCES, &params).await
    }

    /// Latest USD price of a token.
    pub async fn token_price(
        &self,
        chain_id: &str,
        token_contract_address: &str,
    ) -> Result<TokenPriceData, ApiError> {
        let body = json!({
            "chainIndex": chain_id,
            "tokenContractAddress": token_contract_address,
        });
        self.post::<OneOrMany<TokenPriceData>, _>(endpoints::TOKEN_PRICE, &body)
            .await?
            .and_then(OneOrMany::into_first)
            .ok_or_else(|| ApiError::EmptyData(endpoints::TOKEN_PRICE.to_string()))
    }

    /// Daily close price of a token on `date` (UTC day bounds).
    pub async fn historical_price(
        &self,
        chain_id: &str,
        token_contract_address: &str,
        date: NaiveDate,
    ) -> Result<Option<String>, ApiError> {
        let (begin, end) = day_bounds_ms(date)?;
        let params = [
            ("chainIndex", chain_id.to_string()),
            ("tokenContractAddress", token_contract_address.to_string()),
            ("begin", begin.to_string()),
            ("end", end.to_string()),
            ("period", "1d".to_string()),
            ("limit", "1".to_string()),
        ];
        let data: Vec<HistoricalPriceData> =
            self.get_list(endpoints::HISTORICAL_PRICE, &params).await?;

        let price = data
            .into_iter()
            .next()
            .and_then(|d| d.prices.into_iter().next())
            .map(|p| p.price)
            .filter(|p| !p.is_empty());
        if price.is_none() {
            tracing::info!(
                token = %token_contract_address,
                date = %date,
                "No historical price available"
            );
        }
        Ok(price)
    }

    /// Submit a signed transaction through OKX; returns the order id.
    pub async fn broadcast_transaction(
        &self,
        signed_tx: &str,
        chain_index: &str,
        address: Option<&str>,
        account_id: Option<&str>,
    ) -> Result<String, ApiError> {
        let mut body = json!({
            "signedTx": signed_tx,
            "chainIndex": chain_index,
        });
        if let Some(address) = address.filter(|a| !a.is_empty()) {
            body["address"] = json!(address);
        }
        if let Some(account_id) = account_id.filter(|a| !a.is_empty()) {
            body["accountId"] = json!(account_id);
        }
        self.post::<OneOrMany<BroadcastTransactionData>, _>(endpoints::BROADCAST_TRANSACTION, &body)
            .await?
            .and_then(OneOrMany::into_first)
            .map(|d| d.order_id)
            .ok_or_else(|| ApiError::EmptyData(endpoints::BROADCAST_TRANSACTION.to_string()))
    }

    /// Orders previously submitted through [`Self::broadcast_transaction`].
    pub async fn transaction_orders(
        &self,
        query: &TransactionOrdersQuery,
    ) -> Result<Vec<TransactionOrder>, ApiError> {
        self.get_list(endpoints::TRANSACTION_ORDERS, &query.to_params())
            .await
    }
}

impl std::fmt::Debug for OkxDexApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OkxDexApi")
            .field("base_url", &self.base_url)
            .field("api_key", &self.credentials.api_key)
            .finish()
    }
}

/// First and last millisecond of `date` in UTC.
fn day_bounds_ms(date: NaiveDate) -> Result<(i64, i64), ApiError> {
    let begin = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ApiError::Build(format!("invalid date {}", date)))?;
    let end = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or_else(|| ApiError::Build(format!("invalid date {}", date)))?;
    Ok((
        begin.and_utc().timestamp_millis(),
        end.and_utc().timestamp_millis(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_path_encodes_in_order() {
        let path = OkxDexApi::request_path(
            "api/v5/dex/balance/all-token-balances-by-address",
            &[
                ("address", "0xabc".to_string()),
                ("chains", "1,56".to_string()),
            ],
        );
        assert_eq!(
            path,
            "/api/v5/dex/balance/all-token-balances-by-address?address=0xabc&chains=1%2C56"
        );
    }

    #[test]
    fn test_request_path_without_params() {
        assert_eq!(
            OkxDexApi::request_path(endpoints::SUPPORTED_CHAINS, &[]),
            "/api/v5/dex/aggregator/supported/chain"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_removed() {
        let api = OkxDexApi::new(
            Credentials::new("k", "s", "p", None),
            "https://web3.okx.com/",
            None,
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(api.base_url(), "https://web3.okx.com");
    }

    #[test]
    fn test_day_bounds_are_utc() {
        let (begin, end) = day_bounds_ms(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).unwrap();
        assert_eq!(begin, 1_704_067_200_000);
        assert_eq!(end, 1_704_153_599_999);
    }
}
