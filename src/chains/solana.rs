//! Solana chain handler.
//!
//! # Swap Flow
//! ```text
//! aggregator swap (router result + base58 serialized VersionedTransaction)
//!     → decode (bs58 + bincode)
//!     → fresh `confirmed` blockhash, re-sign with the configured keypair
//!     → send to the RPC (preflight `confirmed`, 10 retries)
//!       or base58-encode and hand to the OKX broadcast endpoint
//! ```

use alloy::primitives::U256;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::RpcSendTransactionConfig;
use solana_commitment_config::{CommitmentConfig, CommitmentLevel};
use solana_sdk::hash::Hash;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::signer::keypair::Keypair;
use solana_sdk::signer::Signer;
use solana_sdk::transaction::VersionedTransaction;
use std::fmt::Display;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval, timeout};

use crate::api::OkxDexApi;
use crate::chains::types::{ChainError, ChainResult};
use crate::chains::{ChainHandler, ChainTimeouts};
use crate::config::ChainSettings;
use crate::constants::{
    ChainId, ChainType, DEFAULT_SOLANA_RPC_URL, SOLANA_NATIVE_DECIMALS,
    SOLANA_NATIVE_TOKEN_ADDRESS,
};
use crate::error::{DexError, DexResult};
use crate::models::{SwapRequest, SwapResult};

/// Send attempts the RPC node makes before giving up.
pub const SEND_MAX_RETRIES: usize = 10;

const CONFIRMATION_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Keypair from a base58-encoded 64-byte secret key.
pub fn keypair_from_base58(private_key: &str) -> ChainResult<Keypair> {
    let bytes = bs58::decode(private_key.trim())
        .into_vec()
        .map_err(|e| ChainError::Wallet(format!("Invalid base58 private key: {}", e)))?;
    Keypair::try_from(bytes.as_slice())
        .map_err(|e| ChainError::Wallet(format!("Invalid private key: {}", e)))
}

/// Base58 public key for a base58 private key.
pub fn address_from_private_key(private_key: &str) -> ChainResult<String> {
    Ok(keypair_from_base58(private_key)?.pubkey().to_string())
}

/// Decode the aggregator's base58 serialized transaction.
pub fn decode_transaction(data: &str) -> ChainResult<VersionedTransaction> {
    let bytes = bs58::decode(data.trim())
        .into_vec()
        .map_err(|e| ChainError::InvalidTransaction(format!("base58: {}", e)))?;
    bincode::deserialize(&bytes)
        .map_err(|e| ChainError::InvalidTransaction(format!("transaction bytes: {}", e)))
}

/// Replace the recent blockhash and sign with `keypair`.
pub fn resign_transaction(
    tx: VersionedTransaction,
    blockhash: Hash,
    keypair: &Keypair,
) -> ChainResult<VersionedTransaction> {
    let mut message = tx.message;
    message.set_recent_blockhash(blockhash);
    VersionedTransaction::try_new(message, &[keypair])
        .map_err(|e| ChainError::Wallet(format!("Signing failed: {}", e)))
}

/// Base58 of the bincode-serialized transaction, as the broadcast endpoint expects.
pub fn encode_transaction(tx: &VersionedTransaction) -> ChainResult<String> {
    let bytes = bincode::serialize(tx)
        .map_err(|e| ChainError::InvalidTransaction(format!("serialize: {}", e)))?;
    Ok(bs58::encode(bytes).into_string())
}

/// Handler for Solana mainnet (chain index 501).
pub struct SolanaChain {
    api: OkxDexApi,
    rpc: Arc<RpcClient>,
    rpc_url: String,
    keypair: Arc<Keypair>,
    timeouts: ChainTimeouts,
    wait_for_confirmation: bool,
}

impl SolanaChain {
    /// Create a handler. A blank RPC URL falls back to public mainnet.
    pub fn new(api: OkxDexApi, settings: &ChainSettings, timeouts: ChainTimeouts) -> DexResult<Self> {
        let rpc_url = if settings.rpc_url.trim().is_empty() {
            DEFAULT_SOLANA_RPC_URL.to_string()
        } else {
            settings.rpc_url.clone()
        };
        let keypair = keypair_from_base58(settings.private_key.expose())?;
        let rpc = RpcClient::new_with_timeout_and_commitment(
            rpc_url.clone(),
            timeouts.rpc,
            CommitmentConfig::confirmed(),
        );

        tracing::info!(
            rpc_url = %rpc_url,
            address = %keypair.pubkey(),
            "Solana chain handler initialized"
        );

        Ok(Self {
            api,
            rpc: Arc::new(rpc),
            rpc_url,
            keypair: Arc::new(keypair),
            timeouts,
            wait_for_confirmation: true,
        })
    }

    /// Whether `execute_swap` waits for `confirmed` status before returning.
    pub fn with_confirmation(mut self, wait: bool) -> Self {
        self.wait_for_confirmation = wait;
        self
    }

    pub fn pubkey(&self) -> Pubkey {
        self.keypair.pubkey()
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn timed<T, E, F>(&self, op: &'static str, fut: F) -> ChainResult<T>
    where
        F: Future<Output = Result<T, E>>,
        E: Display,
    {
        match timeout(self.timeouts.rpc, fut).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(e)) => {
                tracing::warn!(op, error = %e, "Solana RPC error");
                Err(ChainError::Rpc(format!("{}: {}", op, e)))
            }
            Err(_) => {
                tracing::warn!(op, "Solana RPC timeout");
                Err(ChainError::Timeout(self.timeouts.rpc.as_secs()))
            }
        }
    }

    fn ensure_solana(chain_id: &str) -> DexResult<()> {
        if chain_id != ChainId::Solana.as_str() {
            return Err(DexError::InvalidInput(format!(
                "Solana swaps require chain id {}, got {}",
                ChainId::Solana.as_str(),
                chain_id
            )));
        }
        Ok(())
    }

    /// Fetch swap data and produce a transaction signed over a fresh blockhash.
    async fn prepare_swap(
        &self,
        request: &SwapRequest,
    ) -> DexResult<(crate::models::RouterResult, VersionedTransaction)> {
        Self::ensure_solana(&request.chain_id)?;

        let info = self.api.swap(request).await?;
        let (blockhash, _) = self
            .timed(
                "getLatestBlockhash",
                self.rpc
                    .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed()),
            )
            .await?;

        let original = decode_transaction(&info.tx.data)?;
        let signed = resign_transaction(original, blockhash, &self.keypair)?;

        tracing::debug!(blockhash = %blockhash, "Re-signed swap transaction");
        Ok((info.router_result, signed))
    }

    async fn send(&self, tx: &VersionedTransaction) -> ChainResult<Signature> {
        let config = RpcSendTransactionConfig {
            skip_preflight: false,
            preflight_commitment: Some(CommitmentLevel::Confirmed),
            max_retries: Some(SEND_MAX_RETRIES),
            ..Default::default()
        };
        self.timed(
            "sendTransaction",
            self.rpc.send_transaction_with_config(tx, config),
        )
        .await
    }

    /// Poll until the signature reaches `confirmed` or the timeout elapses.
    pub async fn poll_for_confirmation(&self, signature: &Signature) -> ChainResult<()> {
        let result = timeout(self.timeouts.confirmation, async {
            let mut ticker = interval(CONFIRMATION_POLL_INTERVAL);
            loop {
                ticker.tick().await;

                let status = self
                    .timed(
                        "getSignatureStatuses",
                        self.rpc.get_signature_status_with_commitment(
                            signature,
                            CommitmentConfig::confirmed(),
                        ),
                    )
                    .await?;

                match status {
                    Some(Ok(())) => return Ok(()),
                    Some(Err(e)) => {
                        return Err(ChainError::Reverted(format!("{}: {}", signature, e)))
                    }
                    None => tracing::debug!(signature = %signature, "Transaction pending"),
                }
            }
        })
        .await;

        match result {
            Ok(status) => status,
            Err(_) => Err(ChainError::ConfirmationTimeout {
                tx_hash: signature.to_string(),
                secs: self.timeouts.confirmation.as_secs(),
            }),
        }
    }

    /// Sign the swap and submit it through the OKX broadcast endpoint.
    /// Returns the OKX order id for tracking.
    pub async fn execute_swap_via_broadcast(&self, request: &SwapRequest) -> DexResult<String> {
        let (_, signed) = self.prepare_swap(request).await?;
        let encoded = encode_transaction(&signed)?;

        let order_id = self
            .api
            .broadcast_transaction(
                &encoded,
                ChainId::Solana.as_str(),
                Some(&request.user_wallet_address),
                None,
            )
            .await?;

        tracing::info!(order_id = %order_id, "Swap broadcast through OKX");
        Ok(order_id)
    }
}

impl std::fmt::Debug for SolanaChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolanaChain")
            .field("rpc_url", &self.rpc_url)
            .field("address", &self.keypair.pubkey())
            .finish()
    }
}

#[async_trait]
impl ChainHandler for SolanaChain {
    fn chain_type(&self) -> ChainType {
        ChainType::Solana
    }

    fn wallet_address(&self) -> DexResult<String> {
        Ok(self.pubkey().to_string())
    }

    async fn token_decimals(&self, token_address: &str) -> DexResult<u8> {
        if token_address.trim() == SOLANA_NATIVE_TOKEN_ADDRESS {
            return Ok(SOLANA_NATIVE_DECIMALS);
        }
        let mint = Pubkey::from_str(token_address.trim())
            .map_err(|e| DexError::InvalidInput(format!("mint '{}': {}", token_address, e)))?;
        let supply = self
            .timed("getTokenSupply", self.rpc.get_token_supply(&mint))
            .await?;
        Ok(supply.decimals)
    }

    async fn execute_swap(&self, request: &SwapRequest) -> DexResult<SwapResult> {
        let (router_result, signed) = self.prepare_swap(request).await?;
        let signature = self.send(&signed).await?;
        tracing::info!(signature = %signature, "Swap transaction sent");

        if self.wait_for_confirmation {
            self.poll_for_confirmation(&signature).await?;
            tracing::info!(signature = %signature, "Swap confirmed");
        }

        Ok(SwapResult::new(router_result, signature.to_string()))
    }

    async fn approve(&self, _chain_id: &str, _token_address: &str, _amount: U256) -> DexResult<String> {
        Err(ChainError::Unsupported("token approval is not applicable on Solana".to_string()).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::transaction::Transaction;

    fn unsigned_swap_tx(payer: &Pubkey) -> String {
        let tx = Transaction::new_with_payer(&[], Some(payer));
        encode_transaction(&VersionedTransaction::from(tx)).unwrap()
    }

    #[test]
    fn test_keypair_from_base58_roundtrip() {
        let keypair = Keypair::new();
        let encoded = bs58::encode(keypair.to_bytes()).into_string();
        let loaded = keypair_from_base58(&encoded).unwrap();
        assert_eq!(loaded.pubkey(), keypair.pubkey());
        assert_eq!(
            address_from_private_key(&encoded).unwrap(),
            keypair.pubkey().to_string()
        );
    }

    #[test]
    fn test_invalid_keypair_rejected() {
        assert!(matches!(
            keypair_from_base58("0OIl"),
            Err(ChainError::Wallet(_))
        ));
        let short = bs58::encode([1u8; 16]).into_string();
        assert!(matches!(keypair_from_base58(&short), Err(ChainError::Wallet(_))));
    }

    #[test]
    fn test_resign_replaces_blockhash_and_signs() {
        let keypair = Keypair::new();
        let tx = decode_transaction(&unsigned_swap_tx(&keypair.pubkey())).unwrap();
        let blockhash = Hash::new_from_array([7u8; 32]);

        let signed = resign_transaction(tx, blockhash, &keypair).unwrap();
        assert_eq!(signed.message.recent_blockhash(), &blockhash);
        assert!(signed.verify_with_results().into_iter().all(|ok| ok));
    }

    #[test]
    fn test_resign_with_wrong_key_fails() {
        let payer = Keypair::new();
        let other = Keypair::new();
        let tx = decode_transaction(&unsigned_swap_tx(&payer.pubkey())).unwrap();
        assert!(resign_transaction(tx, Hash::new_from_array([7u8; 32]), &other).is_err());
    }

    #[test]
    fn test_decode_garbage_rejected() {
        assert!(matches!(
            decode_transaction("not-base58!"),
            Err(ChainError::InvalidTransaction(_))
        ));
        assert!(matches!(
            decode_transaction(&bs58::encode([0u8; 3]).into_string()),
            Err(ChainError::InvalidTransaction(_))
        ));
    }

    #[test]
    fn test_swap_requires_solana_chain_id() {
        assert!(SolanaChain::ensure_solana("501").is_ok());
        assert!(SolanaChain::ensure_solana("56").is_err());
    }
}
