//! hostmon-core — shared library for the hostmon agent.
//!
//! Provides:
//! - `collector` — disk, CPU and filesystem counter collection from `/proc`
//! - `model` — typed snapshot and rate records
//! - `rates` — delta-to-rate conversion for monotonic counters
//! - `alert` — three-tier threshold evaluation
//! - `config` — lenient threshold configuration loading

pub mod alert;
pub mod collector;
pub mod config;
pub mod model;
pub mod rates;

/// Version string with embedded git SHA, e.g. "0.1.0 (a1b2c3d)".
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")");
