//! CPU busy-percent tracking across consecutive `/proc/stat` samples.

use std::collections::HashMap;

use crate::collector::procfs::parser::CpuTicks;
use crate::model::CpuBusy;

/// Converts cumulative scheduler ticks into busy-percent per CPU.
///
/// Busy time is everything that is not idle, so iowait counts as busy.
/// The tracker owns the previous tick sample; the first call only primes it
/// and yields no percents. Tick counters are monotonic — a regression (e.g.
/// a CPU brought offline and back) saturates to a zero delta for that tick.
#[derive(Debug, Default)]
pub struct CpuPercentTracker {
    prev: HashMap<i16, CpuTicks>,
}

impl CpuPercentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current tick sample and get busy-percent for every CPU seen
    /// in both this sample and the previous one.
    pub fn update(&mut self, ticks: &[CpuTicks]) -> Vec<CpuBusy> {
        let mut busy = Vec::with_capacity(ticks.len());

        for t in ticks {
            let Some(prev) = self.prev.get(&t.cpu_id) else {
                continue;
            };
            let total_d = t.total().saturating_sub(prev.total()) as f64;
            if total_d <= 0.0 {
                continue;
            }
            let idle_d = t.idle.saturating_sub(prev.idle) as f64;
            busy.push(CpuBusy {
                core_id: t.cpu_id,
                busy_pct: (1.0 - idle_d / total_d) * 100.0,
            });
        }

        self.prev = ticks.iter().map(|t| (t.cpu_id, *t)).collect();
        busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticks(cpu_id: i16, user: u64, system: u64, idle: u64, iowait: u64) -> CpuTicks {
        CpuTicks {
            cpu_id,
            user,
            system,
            idle,
            iowait,
            ..Default::default()
        }
    }

    #[test]
    fn first_sample_yields_no_percents() {
        let mut tracker = CpuPercentTracker::new();
        let busy = tracker.update(&[ticks(-1, 100, 50, 800, 20)]);
        assert!(busy.is_empty());
    }

    #[test]
    fn busy_percent_from_tick_deltas() {
        let mut tracker = CpuPercentTracker::new();
        tracker.update(&[ticks(-1, 100, 50, 800, 0)]);

        // +30 user, +10 system, +60 idle over 100 total ticks → 40% busy
        let busy = tracker.update(&[ticks(-1, 130, 60, 860, 0)]);
        assert_eq!(busy.len(), 1);
        assert_eq!(busy[0].core_id, -1);
        assert!((busy[0].busy_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn iowait_counts_as_busy() {
        let mut tracker = CpuPercentTracker::new();
        tracker.update(&[ticks(0, 0, 0, 0, 0)]);

        // 50 idle, 50 iowait → 50% busy
        let busy = tracker.update(&[ticks(0, 0, 0, 50, 50)]);
        assert!((busy[0].busy_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn cores_appearing_mid_run_are_skipped_for_one_tick() {
        let mut tracker = CpuPercentTracker::new();
        tracker.update(&[ticks(-1, 100, 0, 100, 0), ticks(0, 100, 0, 100, 0)]);

        // cpu1 hot-plugged: no baseline yet
        let busy = tracker.update(&[
            ticks(-1, 200, 0, 200, 0),
            ticks(0, 200, 0, 200, 0),
            ticks(1, 10, 0, 10, 0),
        ]);
        assert_eq!(busy.len(), 2);
        assert!(busy.iter().all(|b| b.core_id != 1));

        // Next tick it participates
        let busy = tracker.update(&[
            ticks(-1, 300, 0, 300, 0),
            ticks(0, 300, 0, 300, 0),
            ticks(1, 20, 0, 20, 0),
        ]);
        assert_eq!(busy.len(), 3);
    }

    #[test]
    fn tick_regression_yields_no_sample() {
        let mut tracker = CpuPercentTracker::new();
        tracker.update(&[ticks(-1, 1000, 0, 1000, 0)]);

        // Counters went backwards: total delta saturates to 0, skip
        let busy = tracker.update(&[ticks(-1, 10, 0, 10, 0)]);
        assert!(busy.is_empty());
    }
}
