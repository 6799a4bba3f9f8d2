//! Delta-to-rate conversion for monotonic disk counters.
//!
//! This module is the **single source of truth** for rate computation: the
//! daemon's tick loop and any future frontend delegate to
//! [`compute_disk_rates`]. The function is pure — the caller owns baseline
//! retention (keep the current snapshot as the previous one for the next
//! call) and must never feed snapshots out of timestamp order.

use std::collections::BTreeMap;

use crate::model::{CounterSnapshot, DiskRates};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for rate computation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    /// Elapsed time between the snapshots was zero or negative. The caller
    /// should skip emission for this tick and keep its existing baseline.
    InvalidInterval { prev_ns: i64, curr_ns: i64 },
}

impl std::fmt::Display for RateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateError::InvalidInterval { prev_ns, curr_ns } => write!(
                f,
                "invalid sampling interval: previous={}ns current={}ns",
                prev_ns, curr_ns
            ),
        }
    }
}

impl std::error::Error for RateError {}

// ---------------------------------------------------------------------------
// Delta helper
// ---------------------------------------------------------------------------

/// Compute a u64 counter delta, clamping regressions to 0.
///
/// A current value below the previous one means the counter wrapped or the
/// device was reset; the delta (and therefore the rate) is clamped to zero
/// rather than propagating a negative throughput.
pub fn du64(curr: u64, prev: u64) -> u64 {
    curr.saturating_sub(prev)
}

// ---------------------------------------------------------------------------
// Rate computation
// ---------------------------------------------------------------------------

const NS_PER_SEC: f64 = 1e9;

/// Compute per-device I/O rates from two consecutive snapshots.
///
/// Only devices present in **both** snapshots produce an entry; devices that
/// appeared or disappeared between the ticks are skipped for this tick, not
/// an error. Rates are operations/second and bytes/second.
///
/// Fails with [`RateError::InvalidInterval`] when
/// `current.timestamp_ns <= previous.timestamp_ns`.
pub fn compute_disk_rates(
    previous: &CounterSnapshot,
    current: &CounterSnapshot,
) -> Result<BTreeMap<String, DiskRates>, RateError> {
    let dt_ns = current.timestamp_ns - previous.timestamp_ns;
    if dt_ns <= 0 {
        return Err(RateError::InvalidInterval {
            prev_ns: previous.timestamp_ns,
            curr_ns: current.timestamp_ns,
        });
    }
    let dt_secs = dt_ns as f64 / NS_PER_SEC;

    let mut rates = BTreeMap::new();
    for (device, curr) in &current.disks {
        let Some(prev) = previous.disks.get(device) else {
            continue;
        };

        let reads_delta = du64(curr.reads, prev.reads);
        let writes_delta = du64(curr.writes, prev.writes);
        let read_bytes_delta = du64(curr.read_bytes, prev.read_bytes);
        let write_bytes_delta = du64(curr.write_bytes, prev.write_bytes);

        rates.insert(
            device.clone(),
            DiskRates {
                dt_secs,
                reads_delta,
                writes_delta,
                read_bytes_delta,
                write_bytes_delta,
                riops: reads_delta as f64 / dt_secs,
                wiops: writes_delta as f64 / dt_secs,
                read_bytes_s: read_bytes_delta as f64 / dt_secs,
                write_bytes_s: write_bytes_delta as f64 / dt_secs,
            },
        );
    }

    Ok(rates)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
