//! Main collector that assembles a full counter snapshot per tick.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use crate::collector::cpu::CpuPercentTracker;
use crate::collector::procfs::system::{CollectError, SystemCollector, is_relevant_disk};
use crate::collector::traits::FileSystem;
use crate::model::{CounterSnapshot, DiskCounters};

/// `/proc/diskstats` sector unit, fixed by the kernel.
const SECTOR_SIZE: u64 = 512;

/// Timing information for each collector phase.
///
/// Used for debugging and performance monitoring.
#[derive(Debug, Clone, Default)]
pub struct CollectorTiming {
    /// Total snapshot collection time.
    pub total: Duration,
    /// Time to collect disk statistics.
    pub diskstats: Duration,
    /// Time to collect CPU ticks and derive busy-percent.
    pub cpu: Duration,
    /// Time to collect filesystem usage.
    pub filesystems: Duration,
}

/// Collects one [`CounterSnapshot`] per tick.
///
/// Combines the `/proc` system collector with CPU percent tracking and
/// stamps each snapshot with a monotonic timestamp. Disk collection failing
/// fails the snapshot; the CPU and filesystem sections degrade to empty so
/// one unreadable file never poisons the whole tick.
pub struct Collector<F: FileSystem> {
    system_collector: SystemCollector<F>,
    cpu_tracker: CpuPercentTracker,
    /// Monotonic epoch for snapshot timestamps.
    started: Instant,
    /// Timing information from the last collect_snapshot call.
    last_timing: Option<CollectorTiming>,
}

impl<F: FileSystem> Collector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            system_collector: SystemCollector::new(fs, proc_path),
            cpu_tracker: CpuPercentTracker::new(),
            started: Instant::now(),
            last_timing: None,
        }
    }

    /// Returns timing information from the last collect_snapshot call.
    pub fn last_timing(&self) -> Option<&CollectorTiming> {
        self.last_timing.as_ref()
    }

    /// Collects a complete counter snapshot.
    ///
    /// Gathers per-device I/O counters (relevant block devices only), CPU
    /// busy-percent (empty on the first call — percent needs a tick delta)
    /// and per-mount filesystem usage.
    pub fn collect_snapshot(&mut self) -> Result<CounterSnapshot, CollectError> {
        let total_start = Instant::now();
        let mut timing = CollectorTiming::default();

        let timestamp_ns = self.started.elapsed().as_nanos() as i64;

        let start = Instant::now();
        let disks: BTreeMap<String, DiskCounters> = self
            .system_collector
            .collect_diskstats()?
            .into_iter()
            .filter(|d| is_relevant_disk(&d.device))
            .map(|d| {
                (
                    d.device,
                    DiskCounters {
                        reads: d.reads,
                        writes: d.writes,
                        read_bytes: d.read_sectors * SECTOR_SIZE,
                        write_bytes: d.write_sectors * SECTOR_SIZE,
                    },
                )
            })
            .collect();
        timing.diskstats = start.elapsed();

        let start = Instant::now();
        let cpus = match self.system_collector.collect_cpu_ticks() {
            Ok(ticks) => self.cpu_tracker.update(&ticks),
            Err(_) => Vec::new(),
        };
        timing.cpu = start.elapsed();

        let start = Instant::now();
        let filesystems = self
            .system_collector
            .collect_filesystems()
            .unwrap_or_default();
        timing.filesystems = start.elapsed();

        timing.total = total_start.elapsed();
        self.last_timing = Some(timing);

        Ok(CounterSnapshot {
            timestamp_ns,
            disks,
            cpus,
            filesystems,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_collect_snapshot() {
        let fs = MockFs::typical_system();
        let mut collector = Collector::new(fs, "/proc");

        let snapshot = collector.collect_snapshot().unwrap();

        // Partitions filtered out: sda and nvme0n1 survive, sda1 does not
        assert_eq!(snapshot.disks.len(), 2);
        assert!(snapshot.disks.contains_key("sda"));
        assert!(snapshot.disks.contains_key("nvme0n1"));
        assert!(!snapshot.disks.contains_key("sda1"));

        let sda = snapshot.disks.get("sda").unwrap();
        assert_eq!(sda.reads, 12345);
        assert_eq!(sda.read_bytes, 987654 * 512);
        assert_eq!(sda.write_bytes, 456789 * 512);

        // First snapshot: no CPU percents yet
        assert!(snapshot.cpus.is_empty());

        assert_eq!(snapshot.filesystems.len(), 2);
    }

    #[test]
    fn test_unchanged_stat_yields_no_cpu_percents() {
        // Identical /proc/stat on both ticks: zero tick delta, no samples
        let mut collector = Collector::new(MockFs::typical_system(), "/proc");
        collector.collect_snapshot().unwrap();
        let second = collector.collect_snapshot().unwrap();
        assert!(second.cpus.is_empty());
    }

    #[test]
    fn test_cpu_percents_across_changing_samples() {
        let mut tracker = CpuPercentTracker::new();

        let first = SystemCollector::new(MockFs::typical_system(), "/proc")
            .collect_cpu_ticks()
            .unwrap();
        assert!(tracker.update(&first).is_empty());

        let second = SystemCollector::new(MockFs::io_burst(), "/proc")
            .collect_cpu_ticks()
            .unwrap();
        let busy = tracker.update(&second);

        // Aggregate + 4 cores, all with advanced counters
        assert_eq!(busy.len(), 5);
        assert_eq!(busy[0].core_id, -1);
        assert!(busy[0].busy_pct > 0.0 && busy[0].busy_pct <= 100.0);
    }

    #[test]
    fn test_snapshot_timestamps_are_monotonic() {
        let mut collector = Collector::new(MockFs::typical_system(), "/proc");
        let first = collector.collect_snapshot().unwrap();
        let second = collector.collect_snapshot().unwrap();
        assert!(second.timestamp_ns >= first.timestamp_ns);
    }

    #[test]
    fn test_missing_diskstats_fails_snapshot() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu  100 0 50 800 20 5 5 0 0 0\n");
        let mut collector = Collector::new(fs, "/proc");

        assert!(collector.collect_snapshot().is_err());
    }

    #[test]
    fn test_missing_optional_sections_degrade_to_empty() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/diskstats",
            "   8       0 sda 1 0 8 0 1 0 8 0 0 0 0 0 0 0 0\n",
        );
        let mut collector = Collector::new(fs, "/proc");

        let snapshot = collector.collect_snapshot().unwrap();
        assert_eq!(snapshot.disks.len(), 1);
        assert!(snapshot.cpus.is_empty());
        assert!(snapshot.filesystems.is_empty());
    }
}
