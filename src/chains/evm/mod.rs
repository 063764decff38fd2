//! EVM chain handler.
//!
//! # Swap Flow
//! ```text
//! aggregator swap (router result + unsigned tx)
//!     → allowance check for ERC-20 input, approve if short
//!     → transaction.rs (EIP-1559 fees, 1.5× gas, simulate)
//!     → wallet.rs (sign) → client.rs (send raw, poll receipt)
//! ```

pub mod client;
pub mod transaction;
pub mod wallet;

use alloy::primitives::{Address, Bytes, U256};
use alloy::sol_types::SolCall;
use async_trait::async_trait;

use crate::api::OkxDexApi;
use crate::chains::{ChainHandler, ChainTimeouts};
use crate::config::ChainSettings;
use crate::constants::{ChainType, EVM_NATIVE_DECIMALS, EVM_NATIVE_TOKEN_ADDRESS};
use crate::error::DexResult;
use crate::models::{SwapRequest, SwapResult};

pub use client::{EvmRpcClient, IERC20};
pub use transaction::{FeeStrategy, TxSender};
pub use wallet::{address_from_private_key, EvmWallet};

use transaction::{buffered_gas_limit, parse_address, parse_calldata, parse_gas, parse_u256};

/// Handler for EVM-compatible chains.
#[derive(Debug, Clone)]
pub struct EvmChain {
    api: OkxDexApi,
    sender: TxSender,
}

impl EvmChain {
    pub fn new(api: OkxDexApi, settings: &ChainSettings, timeouts: ChainTimeouts) -> DexResult<Self> {
        let client = EvmRpcClient::new(&settings.rpc_url, timeouts.rpc)?;
        let wallet = EvmWallet::from_private_key(settings.private_key.expose())?;

        tracing::info!(
            rpc_url = %settings.rpc_url,
            address = %wallet.address(),
            "EVM chain handler initialized"
        );

        Ok(Self {
            api,
            sender: TxSender::new(client, wallet, timeouts.confirmation),
        })
    }

    pub fn address(&self) -> Address {
        self.sender.wallet().address()
    }

    fn is_native(token_address: &str) -> bool {
        token_address.trim().eq_ignore_ascii_case(EVM_NATIVE_TOKEN_ADDRESS)
    }

    /// Approve `spender` for `amount` of `token` unless the allowance already covers it.
    async fn ensure_allowance(&self, token: Address, spender: Address, amount: U256) -> DexResult<()> {
        let owner = self.address();
        let current = self
            .sender
            .client()
            .erc20_allowance(token, owner, spender)
            .await?;

        tracing::debug!(
            token = %token,
            spender = %spender,
            allowance = %current,
            required = %amount,
            "Checked token allowance"
        );

        if current >= amount {
            return Ok(());
        }

        tracing::info!(
            token = %token,
            spender = %spender,
            amount = %amount,
            "Allowance too low, approving"
        );

        let data = IERC20::approveCall {
            spender,
            value: amount,
        }
        .abi_encode();
        let tx = self
            .sender
            .build(token, U256::ZERO, Bytes::from(data), None, FeeStrategy::Approve)
            .await?;
        let tx_hash = self.sender.sign_and_send(tx).await?;
        self.sender.wait_for_receipt(tx_hash).await?;

        tracing::info!(tx_hash = %tx_hash, "Approval confirmed");
        Ok(())
    }
}

#[async_trait]
impl ChainHandler for EvmChain {
    fn chain_type(&self) -> ChainType {
        ChainType::Evm
    }

    fn wallet_address(&self) -> DexResult<String> {
        Ok(self.address().to_checksum(None))
    }

    async fn token_decimals(&self, token_address: &str) -> DexResult<u8> {
        if Self::is_native(token_address) {
            return Ok(EVM_NATIVE_DECIMALS);
        }
        let token = parse_address(token_address, "token address")?;
        Ok(self.sender.client().erc20_decimals(token).await?)
    }

    async fn execute_swap(&self, request: &SwapRequest) -> DexResult<SwapResult> {
        let info = self.api.swap(request).await?;
        let tx_data = &info.tx;

        let to = parse_address(&tx_data.to, "tx.to")?;

        if !Self::is_native(&request.from_token_address) {
            let token = parse_address(&request.from_token_address, "from token")?;
            let amount = parse_u256(&request.amount, "amount")?;
            self.ensure_allowance(token, to, amount).await?;
        }

        let value = parse_u256(&tx_data.value, "tx.value")?;
        let data = parse_calldata(&tx_data.data)?;
        let gas = buffered_gas_limit(parse_gas(&tx_data.gas, "tx.gas")?);

        let tx = self
            .sender
            .build(to, value, data, Some(gas), FeeStrategy::Swap)
            .await?;
        self.sender.simulate(&tx).await?;

        let tx_hash = self.sender.sign_and_send(tx).await?;
        self.sender.wait_for_receipt(tx_hash).await?;

        tracing::info!(
            chain_id = %request.chain_id,
            tx_hash = %tx_hash,
            from_token = %info.router_result.from_token.token_symbol,
            to_token = %info.router_result.to_token.token_symbol,
            "Swap confirmed"
        );

        Ok(SwapResult::new(info.router_result, tx_hash.to_string()))
    }

    async fn approve(&self, chain_id: &str, token_address: &str, amount: U256) -> DexResult<String> {
        let approval = self
            .api
            .approve_transaction(chain_id, token_address, &amount.to_string())
            .await?;

        let token = parse_address(token_address, "token address")?;
        let data = parse_calldata(&approval.data)?;
        let gas = parse_gas(&approval.gas_limit, "gasLimit")?;

        let tx = self
            .sender
            .build(token, U256::ZERO, data, Some(gas), FeeStrategy::Approve)
            .await?;
        let tx_hash = self.sender.sign_and_send(tx).await?;
        self.sender.wait_for_receipt(tx_hash).await?;

        tracing::info!(
            token = %token_address,
            spender = %approval.dex_contract_address,
            tx_hash = %tx_hash,
            "Approval confirmed"
        );
        Ok(tx_hash.to_string())
    }
}
