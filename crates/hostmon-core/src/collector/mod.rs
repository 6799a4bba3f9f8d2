//! Host counter collection from the Linux `/proc` filesystem.
//!
//! This module provides the infrastructure for sampling disk, CPU and
//! filesystem counters, with support for mocking so the whole pipeline can
//! be tested off-Linux and in CI.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                      Collector                        │
//! │  ┌─────────────────────┐   ┌───────────────────────┐  │
//! │  │  SystemCollector    │   │   CpuPercentTracker   │  │
//! │  │  - /proc/diskstats  │   │  - tick deltas →      │  │
//! │  │  - /proc/stat       │   │    busy-percent       │  │
//! │  │  - /proc/mounts     │   └───────────────────────┘  │
//! │  └──────────┬──────────┘                              │
//! │             │                                         │
//! │      ┌──────▼──────┐                                  │
//! │      │  FileSystem │ (trait)                          │
//! │      └──────┬──────┘                                  │
//! └─────────────┼─────────────────────────────────────────┘
//!               │
//!       ┌───────┼───────────────┐
//!       │       │               │
//! ┌─────▼─────┐ ┌─────▼─────┐ ┌─────▼─────┐
//! │  RealFs   │ │  MockFs   │ │ Scenarios │
//! │  (Linux)  │ │ (Testing) │ │ (Fixtures)│
//! └───────────┘ └───────────┘ └───────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use hostmon_core::collector::{Collector, RealFs};
//!
//! let mut collector = Collector::new(RealFs::new(), "/proc");
//! let snapshot = collector.collect_snapshot().unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use hostmon_core::collector::{Collector, MockFs};
//!
//! let mut collector = Collector::new(MockFs::typical_system(), "/proc");
//! let snapshot = collector.collect_snapshot().unwrap();
//! assert!(!snapshot.disks.is_empty());
//! ```

#[allow(clippy::module_inception)]
mod collector;
mod cpu;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use collector::{Collector, CollectorTiming};
pub use cpu::CpuPercentTracker;
pub use mock::MockFs;
pub use procfs::CollectError;
pub use traits::{FileSystem, RealFs};
