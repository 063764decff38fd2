//! OKX DEX REST API subsystem.
//!
//! # Data Flow
//! ```text
//! endpoint call (typed request)
//!     → client.rs (path + query, JSON body)
//!     → auth.rs (timestamp, HMAC-SHA256 signature, OK-ACCESS-* headers)
//!     → reqwest
//!     → types.rs (envelope {code, msg, data}, error mapping)
//!     → typed models
//! ```

pub mod auth;
pub mod client;
pub mod types;

pub use auth::Credentials;
pub use client::OkxDexApi;
pub use types::{ApiError, ApiResponse};
