//! Typed data model for snapshots and derived rates.
//!
//! Every record here replaces what the measurement pipeline would otherwise
//! carry as loosely keyed maps: one struct per counter source, captured once
//! per tick and never mutated afterwards.

use std::collections::BTreeMap;

use serde::Serialize;

/// Cumulative I/O counters for one block device.
///
/// All fields are monotonically non-decreasing between reboots. Sector counts
/// from `/proc/diskstats` are converted to bytes (512 bytes/sector) at
/// collection time so the rest of the pipeline only ever sees bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct DiskCounters {
    /// Reads completed.
    pub reads: u64,
    /// Writes completed.
    pub writes: u64,
    /// Bytes read.
    pub read_bytes: u64,
    /// Bytes written.
    pub write_bytes: u64,
}

/// Busy-percent sample for one CPU.
///
/// `core_id == -1` is the aggregate over all cores.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CpuBusy {
    pub core_id: i16,
    pub busy_pct: f64,
}

/// Capacity usage for one mounted filesystem.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FsUsage {
    pub total_bytes: u64,
    pub avail_bytes: u64,
}

impl FsUsage {
    /// Used capacity as a percentage of total. Zero-sized filesystems
    /// (pseudo mounts that slipped through filtering) report 0%.
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        let used = self.total_bytes.saturating_sub(self.avail_bytes);
        used as f64 * 100.0 / self.total_bytes as f64
    }
}

/// A point-in-time capture of all sampled host counters.
///
/// `timestamp_ns` is a monotonic instant in nanoseconds since an arbitrary
/// process-local epoch; only differences between two snapshots are
/// meaningful. Entity maps are `BTreeMap` so iteration order is always
/// sorted by identifier, which keeps batch alert evaluation deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CounterSnapshot {
    pub timestamp_ns: i64,

    /// Per-device cumulative I/O counters, keyed by device name.
    pub disks: BTreeMap<String, DiskCounters>,

    /// Busy-percent per CPU, aggregate first. Empty on the very first
    /// collection: percent needs a tick delta.
    pub cpus: Vec<CpuBusy>,

    /// Per-mount capacity usage, keyed by mount point.
    pub filesystems: BTreeMap<String, FsUsage>,
}

/// Per-device rates derived from two consecutive snapshots.
///
/// Units are operations/second and bytes/second throughout. Deltas are kept
/// alongside the rates so counter-style sinks can be incremented without
/// multiplying a rate back up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct DiskRates {
    /// Interval the deltas were taken over, in seconds.
    pub dt_secs: f64,

    pub reads_delta: u64,
    pub writes_delta: u64,
    pub read_bytes_delta: u64,
    pub write_bytes_delta: u64,

    /// Read operations per second.
    pub riops: f64,
    /// Write operations per second.
    pub wiops: f64,
    /// Read throughput, bytes per second.
    pub read_bytes_s: f64,
    /// Write throughput, bytes per second.
    pub write_bytes_s: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_used_percent() {
        let fs = FsUsage {
            total_bytes: 1000,
            avail_bytes: 250,
        };
        assert!((fs.used_percent() - 75.0).abs() < 1e-9);
    }

    #[test]
    fn fs_used_percent_zero_total() {
        let fs = FsUsage::default();
        assert_eq!(fs.used_percent(), 0.0);
    }

    #[test]
    fn fs_used_percent_avail_exceeds_total() {
        // statvfs can report avail > total on some exotic mounts; never go negative
        let fs = FsUsage {
            total_bytes: 100,
            avail_bytes: 150,
        };
        assert_eq!(fs.used_percent(), 0.0);
    }
}
