//! OKX DEX aggregator client SDK.
//!
//! # Call Chain
//! ```text
//! Settings (env / .env / TOML)
//!     → api::OkxDexApi (HMAC-signed REST calls)
//!     → models (typed responses)
//!     → chains::{EvmChain, SolanaChain} (sign with the configured key, submit to RPC)
//!     → SwapResult (routing info + transaction hash)
//! ```
//!
//! [`OkxDexClient`] is the entry point; the raw REST surface is available via
//! [`OkxDexClient::api`].

pub mod api;
pub mod chains;
pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod observability;
pub mod utils;

pub use api::OkxDexApi;
pub use client::OkxDexClient;
pub use config::{ChainSettings, Settings};
pub use constants::{ChainId, ChainType};
pub use error::{DexError, DexResult};
pub use models::{BalancePercent, Slippage, SwapResult};
