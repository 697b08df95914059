//! Transaction aggregation engine for a personal-finance client.
//!
//! Raw, loosely shaped transaction records go in; category breakdowns and a
//! statement-week time series come out. The engine does no I/O.

pub mod cache;
pub mod config;
pub mod date_utils;
pub mod error;
pub mod filters;
pub mod models;
pub mod observability;
pub mod services;
pub mod state;

pub use config::EngineConfig;
pub use error::{EngineError, EngineResult};
pub use state::AggregationSession;

/// Library version from Cargo.toml (single source of truth)
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
