//! Chain-level error definitions.

use thiserror::Error;

/// Errors raised while signing or submitting transactions.
#[derive(Debug, Error)]
pub enum ChainError {
    /// RPC connection or request failed.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// Transaction was not confirmed within the configured time.
    #[error("Transaction {tx_hash} not confirmed after {secs} seconds")]
    ConfirmationTimeout { tx_hash: String, secs: u64 },

    /// Transaction was reverted on-chain.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// Pre-flight `eth_estimateGas` / `eth_call` rejected the transaction.
    #[error("Transaction simulation failed: {0}")]
    Simulation(String),

    /// Invalid private key format or signing failure.
    #[error("Wallet error: {0}")]
    Wallet(String),

    /// Aggregator returned transaction data that cannot be decoded.
    #[error("Invalid transaction data: {0}")]
    InvalidTransaction(String),

    /// Operation has no meaning for this chain family.
    #[error("Operation not supported: {0}")]
    Unsupported(String),
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ChainError::Timeout(10);
        assert_eq!(err.to_string(), "RPC timeout after 10 seconds");

        let err = ChainError::ConfirmationTimeout {
            tx_hash: "0xabc".to_string(),
            secs: 120,
        };
        assert!(err.to_string().contains("0xabc"));
        assert!(err.to_string().contains("120"));

        let err = ChainError::Unsupported("approve on solana".to_string());
        assert!(err.to_string().contains("approve on solana"));
    }
}
