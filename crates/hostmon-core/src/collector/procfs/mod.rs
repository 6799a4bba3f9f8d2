//! Collectors for the Linux `/proc` filesystem.
//!
//! This module provides parsers and collectors for reading disk, CPU and
//! mount information from the `/proc` virtual filesystem.

pub mod parser;
pub mod system;

pub use system::{CollectError, SystemCollector};
