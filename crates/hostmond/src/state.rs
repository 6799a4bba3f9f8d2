//! Shared application state.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::{Arc, Mutex};

use hostmon_core::alert::AlertResult;
use hostmon_core::collector::{Collector, FileSystem};
use hostmon_core::config::ThresholdMap;
use hostmon_core::model::CounterSnapshot;

use crate::metrics::AgentMetrics;

#[cfg(target_os = "linux")]
pub(crate) type AgentFs = hostmon_core::collector::RealFs;
#[cfg(not(target_os = "linux"))]
pub(crate) type AgentFs = hostmon_core::collector::MockFs;

/// Everything the tick loop mutates, behind one lock.
///
/// The baseline is the previous tick's snapshot; rates are computed against
/// it and it is only replaced on a successful tick, so an invalid sampling
/// interval never discards it.
pub(crate) struct AgentInner<F: FileSystem = AgentFs> {
    pub(crate) collector: Collector<F>,
    pub(crate) baseline: Option<CounterSnapshot>,
    pub(crate) thresholds: ThresholdMap,
    pub(crate) metrics: AgentMetrics,
    pub(crate) tick_count: u64,
    pub(crate) last_alert: Option<AlertResult>,
}

impl<F: FileSystem> AgentInner<F> {
    pub(crate) fn new(collector: Collector<F>, thresholds: ThresholdMap) -> Self {
        Self {
            collector,
            baseline: None,
            thresholds,
            metrics: AgentMetrics::new().expect("failed to build metrics registry"),
            tick_count: 0,
            last_alert: None,
        }
    }
}

pub(crate) type SharedState = Arc<Mutex<AgentInner>>;
