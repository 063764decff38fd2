//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! api / chains / client emit `tracing` events with structured fields
//!     → logging.rs (EnvFilter + fmt layer on stderr)
//! ```
//!
//! # Design Decisions
//! - The library only emits events; installing a subscriber is the binary's job
//! - `RUST_LOG` overrides the configured level
//! - Secrets never appear in event fields

pub mod logging;
