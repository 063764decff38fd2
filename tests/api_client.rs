//! Integration tests for the signed REST client against a mock OKX backend.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;

use okx_dex_sdk::api::{ApiError, OkxDexApi};
use okx_dex_sdk::models::{QuoteRequest, TransactionOrdersQuery};
use okx_dex_sdk::{DexError, OkxDexClient};

mod common;

use common::{ok_envelope, start_mock_okx, RecordedRequest};

fn api(base_url: &str) -> OkxDexApi {
    OkxDexApi::new(common::credentials(), base_url, None, Duration::from_secs(5)).unwrap()
}

fn quote_request() -> QuoteRequest {
    QuoteRequest {
        chain_id: "56".to_string(),
        from_token_address: "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee".to_string(),
        to_token_address: "0x55d398326f99059ff775485246999027b3197955".to_string(),
        amount: "1000000000000000000".to_string(),
        fee_percent: None,
    }
}

fn assert_signed(request: &RecordedRequest, signed_path: &str) {
    let timestamp = request.header("OK-ACCESS-TIMESTAMP").unwrap();
    let expected = common::credentials()
        .sign(timestamp, &request.method, signed_path, &request.body)
        .unwrap();

    assert_eq!(request.header("OK-ACCESS-KEY"), Some(common::API_KEY));
    assert_eq!(request.header("OK-ACCESS-PASSPHRASE"), Some(common::PASSPHRASE));
    assert_eq!(request.header("OK-ACCESS-PROJECT"), Some(common::PROJECT_ID));
    assert_eq!(request.header("OK-ACCESS-SIGN"), Some(expected.as_str()));
    assert_eq!(request.header("Content-Type"), Some("application/json"));
}

#[tokio::test]
async fn test_get_request_is_signed() {
    let mock = start_mock_okx(|_| {
        (
            200,
            ok_envelope(json!([{
                "chainId": 56,
                "chainName": "BNB Chain",
                "dexTokenApproveAddress": "0x2c34A2Fb1d0b4f55de51E1d0bDEfaDDce6b7cDD6"
            }])),
        )
    })
    .await;

    let chains = api(&mock.base_url()).supported_chains().await.unwrap();
    assert_eq!(chains.len(), 1);
    assert_eq!(chains[0].chain_id, "56");

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "GET");
    assert_eq!(requests[0].path, "/api/v5/dex/aggregator/supported/chain");
    assert_signed(&requests[0], &requests[0].path);
}

#[tokio::test]
async fn test_post_request_signs_body() {
    let mock = start_mock_okx(|_| {
        (
            200,
            ok_envelope(json!([{
                "chainIndex": "1",
                "tokenContractAddress": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                "time": "1716892020000",
                "price": "3570.12"
            }])),
        )
    })
    .await;

    let price = api(&mock.base_url())
        .token_price("1", "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee")
        .await
        .unwrap();
    assert_eq!(price.price, "3570.12");

    let request = &mock.requests()[0];
    assert_eq!(request.method, "POST");
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(body["chainIndex"], "1");
    assert_signed(request, "/api/v5/dex/market/price");
}

#[tokio::test]
async fn test_encoded_commas_are_signed_literally() {
    let mock = start_mock_okx(|_| (200, ok_envelope(json!([{ "tokenAssets": [] }])))).await;

    api(&mock.base_url())
        .all_token_balances("0xabc", &["1".to_string(), "56".to_string()], true)
        .await
        .unwrap();

    let request = &mock.requests()[0];
    assert!(request.path.contains("chains=1%2C56"), "{}", request.path);
    assert_signed(request, &request.path.replace("%2C", ","));
}

#[tokio::test]
async fn test_quote_parameters_and_result() {
    let mock = start_mock_okx(|_| {
        (
            200,
            ok_envelope(json!([{
                "chainId": "56",
                "fromToken": {
                    "decimal": "18",
                    "tokenContractAddress": "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee",
                    "tokenSymbol": "BNB",
                    "tokenUnitPrice": "600"
                },
                "fromTokenAmount": "1000000000000000000",
                "toToken": {
                    "decimal": "18",
                    "tokenContractAddress": "0x55d398326f99059ff775485246999027b3197955",
                    "tokenSymbol": "USDT",
                    "tokenUnitPrice": "1"
                },
                "toTokenAmount": "600000000000000000000",
                "quoteCompareList": [
                    { "amountOut": "600", "dexName": "PancakeSwap V3" },
                    { "amountOut": "598.5", "dexName": "Uniswap V3" }
                ]
            }])),
        )
    })
    .await;

    let quote = api(&mock.base_url()).quote(&quote_request()).await.unwrap();
    assert_eq!(quote.to_token.token_symbol, "USDT");
    assert_eq!(
        quote.best_venue().map(|v| v.dex_name.as_str()),
        Some("PancakeSwap V3")
    );

    let request = &mock.requests()[0];
    assert_eq!(
        request.path,
        "/api/v5/dex/aggregator/quote?chainId=56&amount=1000000000000000000\
         &fromTokenAddress=0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee\
         &toTokenAddress=0x55d398326f99059ff775485246999027b3197955"
    );
}

#[tokio::test]
async fn test_upstream_error_code() {
    let mock = start_mock_okx(|_| {
        (
            200,
            json!({ "code": "82000", "msg": "Insufficient liquidity", "data": [] }).to_string(),
        )
    })
    .await;

    let err = api(&mock.base_url()).quote(&quote_request()).await.unwrap_err();
    match err {
        ApiError::Upstream { code, msg } => {
            assert_eq!(code, "82000");
            assert_eq!(msg, "Insufficient liquidity");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_numeric_upstream_error_code() {
    let mock = start_mock_okx(|_| {
        (
            200,
            json!({ "code": 50011, "msg": "Too Many Requests" }).to_string(),
        )
    })
    .await;

    let err = api(&mock.base_url()).supported_chains().await.unwrap_err();
    assert!(matches!(err, ApiError::Upstream { ref code, .. } if code == "50011"));
}

#[tokio::test]
async fn test_http_error_status() {
    let mock = start_mock_okx(|_| (500, "upstream exploded".to_string())).await;

    let err = api(&mock.base_url()).supported_chains().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::Http { status: 500, ref body } if body == "upstream exploded"
    ));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mock = start_mock_okx(|_| (200, "<html>maintenance</html>".to_string())).await;

    let err = api(&mock.base_url()).supported_chains().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn test_missing_record_is_empty_data() {
    let mock = start_mock_okx(|_| (200, ok_envelope(json!([])))).await;

    let err = api(&mock.base_url()).quote(&quote_request()).await.unwrap_err();
    assert!(matches!(err, ApiError::EmptyData(_)));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_error() {
    // Nothing listens on port 9 locally.
    let err = api("http://127.0.0.1:9").supported_chains().await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}

#[tokio::test]
async fn test_client_surfaces_upstream_category() {
    let mock = start_mock_okx(|_| {
        (
            401,
            json!({ "code": "50113", "msg": "Invalid Sign" }).to_string(),
        )
    })
    .await;
    let settings = common::settings(&mock.base_url(), &[]);
    let client = OkxDexClient::new(settings).unwrap();

    let err = client.get_tokens("1").await.unwrap_err();
    assert!(err.is_upstream());
    assert!(matches!(err, DexError::Api(ApiError::Http { status: 401, .. })));
}

#[tokio::test]
async fn test_historical_price_uses_utc_day_bounds() {
    let mock = start_mock_okx(|_| {
        (
            200,
            ok_envelope(json!([{
                "cursor": "1",
                "prices": [{ "time": "1704067200000", "price": "2281.51" }]
            }])),
        )
    })
    .await;

    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let price = api(&mock.base_url())
        .historical_price("1", "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee", date)
        .await
        .unwrap();
    assert_eq!(price.as_deref(), Some("2281.51"));

    let request = &mock.requests()[0];
    assert!(request.path.contains("begin=1704067200000"));
    assert!(request.path.contains("end=1704153599999"));
    assert!(request.path.contains("period=1d"));
}

#[tokio::test]
async fn test_swap_history_absent_record() {
    let mock = start_mock_okx(|_| (200, ok_envelope(json!([])))).await;

    let history = api(&mock.base_url())
        .swap_history("56", "0xdeadbeef", false)
        .await
        .unwrap();
    assert!(history.is_none());

    let request = &mock.requests()[0];
    assert_eq!(request.route(), "/api/v5/dex/aggregator/history");
    assert!(request.path.contains("isFromMyProject=false"));
}

#[tokio::test]
async fn test_broadcast_and_orders() {
    let mock = start_mock_okx(|request| match request.route() {
        "/api/v5/wallet/pre-transaction/broadcast-transaction" => {
            (200, ok_envelope(json!([{ "orderId": "0e7e9d3d" }])))
        }
        _ => (
            200,
            ok_envelope(json!([{
                "chainIndex": "501",
                "address": "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU",
                "orderId": "0e7e9d3d",
                "txStatus": "2",
                "txHash": "5Nf2..."
            }])),
        ),
    })
    .await;
    let api = api(&mock.base_url());

    let order_id = api
        .broadcast_transaction(
            "base58tx",
            "501",
            Some("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU"),
            None,
        )
        .await
        .unwrap();
    assert_eq!(order_id, "0e7e9d3d");

    let orders = api
        .transaction_orders(&TransactionOrdersQuery {
            order_id: Some(order_id.clone()),
            limit: Some(1),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(orders[0].tx_status, "2");

    let requests = mock.requests();
    let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(body["signedTx"], "base58tx");
    assert_eq!(body["chainIndex"], "501");
    assert!(body.get("accountId").is_none());
    assert_eq!(
        requests[1].path,
        "/api/v5/wallet/post-transaction/orders?orderId=0e7e9d3d&limit=1"
    );
}
