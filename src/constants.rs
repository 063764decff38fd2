//! Chain identifiers, native token addresses and aggregator endpoint paths.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default aggregator base URL (production).
pub const DEFAULT_BASE_URL: &str = "https://web3.okx.com";

/// Default Solana RPC endpoint when a chain entry leaves it blank.
pub const DEFAULT_SOLANA_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Placeholder address the aggregator uses for native EVM currency.
pub const EVM_NATIVE_TOKEN_ADDRESS: &str = "0xeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee";

/// System program address, used as the native SOL token address.
pub const SOLANA_NATIVE_TOKEN_ADDRESS: &str = "11111111111111111111111111111111";

pub const SUI_NATIVE_TOKEN_ADDRESS: &str = "0x2::sui::SUI";
pub const TRON_NATIVE_TOKEN_ADDRESS: &str = "T9yD14Nj9j7xAB4dbGeiX9h8unkKHxuWwb";
pub const TON_NATIVE_TOKEN_ADDRESS: &str = "EQAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAM9c";

/// Decimals of native EVM currency (wei).
pub const EVM_NATIVE_DECIMALS: u8 = 18;

/// Decimals of native SOL (lamports).
pub const SOLANA_NATIVE_DECIMALS: u8 = 9;

/// Aggregator REST paths (relative to the base URL, no leading slash).
pub mod endpoints {
    pub const SUPPORTED_CHAINS: &str = "api/v5/dex/aggregator/supported/chain";
    pub const ALL_TOKENS: &str = "api/v5/dex/aggregator/all-tokens";
    pub const GET_LIQUIDITY: &str = "api/v5/dex/aggregator/get-liquidity";
    pub const APPROVE_TRANSACTION: &str = "api/v5/dex/aggregator/approve-transaction";
    pub const QUOTE: &str = "api/v5/dex/aggregator/quote";
    pub const SWAP: &str = "api/v5/dex/aggregator/swap";
    pub const SWAP_HISTORY: &str = "api/v5/dex/aggregator/history";
    pub const TOKEN_BALANCES: &str = "api/v5/dex/balance/token-balances-by-address";
    pub const ALL_TOKEN_BALANCES: &str = "api/v5/dex/balance/all-token-balances-by-address";
    pub const BROADCAST_TRANSACTION: &str = "api/v5/wallet/pre-transaction/broadcast-transaction";
    pub const TRANSACTION_ORDERS: &str = "api/v5/wallet/post-transaction/orders";
    pub const TOKEN_PRICE: &str = "api/v5/dex/market/price";
    pub const HISTORICAL_PRICE: &str = "api/v5/dex/index/historical-price";
}

/// Signing family of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainType {
    Evm,
    Solana,
    Sui,
}

impl ChainType {
    /// Native token address for this chain family.
    pub fn native_token_address(&self) -> &'static str {
        match self {
            ChainType::Evm => EVM_NATIVE_TOKEN_ADDRESS,
            ChainType::Solana => SOLANA_NATIVE_TOKEN_ADDRESS,
            ChainType::Sui => SUI_NATIVE_TOKEN_ADDRESS,
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChainType::Evm => "evm",
            ChainType::Solana => "solana",
            ChainType::Sui => "sui",
        };
        f.write_str(s)
    }
}

impl FromStr for ChainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "evm" => Ok(ChainType::Evm),
            "solana" => Ok(ChainType::Solana),
            "sui" => Ok(ChainType::Sui),
            other => Err(format!("Unknown chain type '{}'", other)),
        }
    }
}

/// Chains known to the aggregator, identified by the aggregator's chain index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChainId {
    Ethereum,
    Oktc,
    Bsc,
    Polygon,
    Fantom,
    Avalanche,
    Arbitrum,
    Optimism,
    Base,
    Solana,
    Sui,
    Tron,
    Ton,
}

impl ChainId {
    pub const ALL: [ChainId; 13] = [
        ChainId::Ethereum,
        ChainId::Oktc,
        ChainId::Bsc,
        ChainId::Polygon,
        ChainId::Fantom,
        ChainId::Avalanche,
        ChainId::Arbitrum,
        ChainId::Optimism,
        ChainId::Base,
        ChainId::Solana,
        ChainId::Sui,
        ChainId::Tron,
        ChainId::Ton,
    ];

    /// The chain index string used on the wire and in settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChainId::Ethereum => "1",
            ChainId::Oktc => "66",
            ChainId::Bsc => "56",
            ChainId::Polygon => "137",
            ChainId::Fantom => "250",
            ChainId::Avalanche => "43114",
            ChainId::Arbitrum => "42161",
            ChainId::Optimism => "10",
            ChainId::Base => "8453",
            ChainId::Solana => "501",
            ChainId::Sui => "784",
            ChainId::Tron => "195",
            ChainId::Ton => "607",
        }
    }

    /// Signing family, or `None` for chains this SDK cannot sign for.
    pub fn chain_type(&self) -> Option<ChainType> {
        match self {
            ChainId::Ethereum
            | ChainId::Oktc
            | ChainId::Bsc
            | ChainId::Polygon
            | ChainId::Fantom
            | ChainId::Avalanche
            | ChainId::Arbitrum
            | ChainId::Optimism
            | ChainId::Base => Some(ChainType::Evm),
            ChainId::Solana => Some(ChainType::Solana),
            ChainId::Sui => Some(ChainType::Sui),
            ChainId::Tron | ChainId::Ton => None,
        }
    }

    /// Address the aggregator uses for this chain's native currency.
    pub fn native_token_address(&self) -> &'static str {
        match self {
            ChainId::Tron => TRON_NATIVE_TOKEN_ADDRESS,
            ChainId::Ton => TON_NATIVE_TOKEN_ADDRESS,
            ChainId::Solana => SOLANA_NATIVE_TOKEN_ADDRESS,
            ChainId::Sui => SUI_NATIVE_TOKEN_ADDRESS,
            _ => EVM_NATIVE_TOKEN_ADDRESS,
        }
    }

    /// Whether `address` is this chain's native token placeholder.
    pub fn is_native_token(&self, address: &str) -> bool {
        address.eq_ignore_ascii_case(self.native_token_address())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ChainId::ALL
            .iter()
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("Unknown chain id '{}'", s))
    }
}
