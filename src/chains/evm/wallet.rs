//! EVM wallet loading and transaction signing.
//!
//! # Security
//! - Private keys come only from chain settings
//! - Keys are never logged or serialized

use alloy::eips::eip2718::Encodable2718;
use alloy::network::{EthereumWallet, TransactionBuilder};
use alloy::primitives::Address;
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;

use crate::chains::types::{ChainError, ChainResult};

/// Local signer for one EVM account.
#[derive(Debug, Clone)]
pub struct EvmWallet {
    signer: PrivateKeySigner,
    wallet: EthereumWallet,
}

impl EvmWallet {
    /// Create a wallet from a hex-encoded private key (with or without `0x`).
    pub fn from_private_key(private_key_hex: &str) -> ChainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ChainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::debug!(address = %signer.address(), "EVM wallet loaded");

        Ok(Self {
            wallet: EthereumWallet::from(signer.clone()),
            signer,
        })
    }

    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign a fully populated request and return the EIP-2718 encoded bytes.
    pub async fn sign_transaction(&self, tx: TransactionRequest) -> ChainResult<Vec<u8>> {
        let envelope = tx
            .build(&self.wallet)
            .await
            .map_err(|e| ChainError::Wallet(format!("Signing failed: {}", e)))?;
        Ok(envelope.encoded_2718())
    }
}

/// Checksummed address for a hex private key.
pub fn address_from_private_key(private_key_hex: &str) -> ChainResult<String> {
    Ok(EvmWallet::from_private_key(private_key_hex)?
        .address()
        .to_checksum(None))
}
