//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! process env / .env / TOML file
//!     → loader.rs (map keys, incl. CHAINS__<id>__RPC_URL / __PRIVATE_KEY)
//!     → validation.rs (semantic checks, all errors collected)
//!     → Settings (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Settings are loaded once at startup; invalid settings never reach the client
//! - Secrets are wrapped so they cannot leak through `Debug` output

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, load_from_vars, ConfigError};
pub use schema::{ChainSettings, RawChainSettings, RawSettings, SecretString, Settings};
pub use validation::{validate_settings, ValidationError};
