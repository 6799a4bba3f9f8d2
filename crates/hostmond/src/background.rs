//! Background tick loop: collect → rates → metrics → alerts.

use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use hostmon_core::alert::{self, AlertLevel, AlertResult};
use hostmon_core::collector::FileSystem;
use hostmon_core::config::{ThresholdMap, Thresholds};
use hostmon_core::model::CounterSnapshot;
use hostmon_core::rates::{self, RateError};

use crate::state::{AgentInner, SharedState};

/// What a single tick did, for loop-level logging.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum TickOutcome {
    /// Baseline primed; rates start next tick.
    Primed,
    /// Rates emitted for this many devices.
    Rated { devices: usize },
    /// Δt ≤ 0 — emission skipped, baseline kept.
    SkippedInvalidInterval,
    /// Snapshot collection failed — tick skipped.
    CollectFailed,
}

// ============================================================
// Tick loop
// ============================================================

pub(crate) async fn tick_loop(state: SharedState, interval: Duration) {
    let mut tick = tokio::time::interval(interval);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tick.tick().await;

        // Run the blocking collection off the async runtime
        let state_clone = state.clone();
        let t0 = Instant::now();
        let result = tokio::task::spawn_blocking(move || {
            let mut inner = state_clone.lock().unwrap();
            let outcome = run_tick(&mut inner);
            (outcome, inner.tick_count)
        })
        .await;

        let elapsed = t0.elapsed();

        match result {
            Ok((outcome, tick_count)) => match outcome {
                TickOutcome::Primed => {
                    info!(
                        duration_ms = elapsed.as_millis() as u64,
                        "first snapshot collected, baseline primed"
                    );
                }
                TickOutcome::Rated { devices } => {
                    debug!(
                        duration_ms = elapsed.as_millis() as u64,
                        devices, tick_count, "tick completed"
                    );
                }
                TickOutcome::SkippedInvalidInterval | TickOutcome::CollectFailed => {
                    warn!(
                        duration_ms = elapsed.as_millis() as u64,
                        ?outcome,
                        "tick produced no rates"
                    );
                }
            },
            Err(e) => {
                error!(error = %e, "tick panicked in spawn_blocking");
            }
        }

        if elapsed > interval / 2 {
            warn!(
                duration_ms = elapsed.as_millis() as u64,
                interval_ms = interval.as_millis() as u64,
                "tick exceeded 50% of interval"
            );
        }
    }
}

// ============================================================
// One tick
// ============================================================

/// Run one measurement tick against the shared state.
///
/// A failed collection or an invalid sampling interval degrades to "no data
/// this tick" — the loop itself never stops, and the baseline survives
/// anything except a successful tick that replaces it.
pub(crate) fn run_tick<F: FileSystem>(inner: &mut AgentInner<F>) -> TickOutcome {
    inner.metrics.inc_tick();

    let snapshot = match inner.collector.collect_snapshot() {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to collect snapshot");
            inner.metrics.inc_skip("collect_failed");
            return TickOutcome::CollectFailed;
        }
    };

    let outcome = if let Some(prev) = inner.baseline.as_ref() {
        match rates::compute_disk_rates(prev, &snapshot) {
            Ok(disk_rates) => {
                for (device, r) in &disk_rates {
                    inner.metrics.record_disk(device, r);
                }
                TickOutcome::Rated {
                    devices: disk_rates.len(),
                }
            }
            Err(e @ RateError::InvalidInterval { .. }) => {
                warn!(error = %e, "skipping emission for this tick, keeping baseline");
                inner.metrics.inc_skip("invalid_interval");
                return TickOutcome::SkippedInvalidInterval;
            }
        }
    } else {
        TickOutcome::Primed
    };

    // Gauges need no baseline
    inner.metrics.record_cpu(&snapshot.cpus);
    inner.metrics.record_filesystems(&snapshot.filesystems);

    let alert = evaluate_alerts(&snapshot, &inner.thresholds);
    match alert.level {
        AlertLevel::Fatal => error!(message = %alert.message, "alert"),
        AlertLevel::Warn => warn!(message = %alert.message, "alert"),
        AlertLevel::None => debug!("no thresholds breached"),
    }
    inner.metrics.record_alert(alert.level);
    inner.last_alert = Some(alert);

    inner.tick_count += 1;
    inner.baseline = Some(snapshot);
    outcome
}

// ============================================================
// Alert wiring
// ============================================================

/// Build the per-entity measurement list and evaluate it.
///
/// Scan order is deterministic: aggregate CPU, cores ascending, then mounts
/// sorted by path. The aggregate matches the `"cpu"` config entry; each core
/// matches `"anycpu"`; each mount matches its own path.
pub(crate) fn evaluate_alerts(
    snapshot: &CounterSnapshot,
    thresholds: &ThresholdMap,
) -> AlertResult {
    let mut entries: Vec<(String, f64, &Thresholds)> = Vec::new();

    for cpu in &snapshot.cpus {
        if cpu.core_id < 0 {
            if let Some(t) = thresholds.get("cpu") {
                entries.push(("cpu".to_string(), cpu.busy_pct, t));
            }
        } else if let Some(t) = thresholds.get("anycpu") {
            entries.push((format!("cpu{}", cpu.core_id), cpu.busy_pct, t));
        }
    }

    for (mount, usage) in &snapshot.filesystems {
        if let Some(t) = thresholds.get(mount) {
            entries.push((mount.clone(), usage.used_percent(), t));
        }
    }

    alert::evaluate_all(entries.iter().map(|(e, v, t)| (e.as_str(), *v, *t)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hostmon_core::collector::{Collector, MockFs};
    use hostmon_core::model::{CpuBusy, FsUsage};

    fn thresholds(entries: &[(&str, f64, f64, f64)]) -> ThresholdMap {
        entries
            .iter()
            .map(|(entity, low, design, engineered)| {
                (
                    entity.to_string(),
                    Thresholds {
                        low: *low,
                        design: *design,
                        engineered: *engineered,
                    },
                )
            })
            .collect()
    }

    fn cpu_snapshot(aggregate: f64, cores: &[f64]) -> CounterSnapshot {
        let mut cpus = vec![CpuBusy {
            core_id: -1,
            busy_pct: aggregate,
        }];
        cpus.extend(cores.iter().enumerate().map(|(i, pct)| CpuBusy {
            core_id: i as i16,
            busy_pct: *pct,
        }));
        CounterSnapshot {
            cpus,
            ..Default::default()
        }
    }

    #[test]
    fn aggregate_cpu_matches_cpu_entry() {
        let config = thresholds(&[("cpu", 2.0, 60.0, 80.0)]);
        let alert = evaluate_alerts(&cpu_snapshot(70.0, &[]), &config);
        assert_eq!(alert.level, AlertLevel::Warn);
        assert!(alert.message.starts_with("cpu:"));
    }

    #[test]
    fn per_core_fatal_short_circuits_before_later_cores() {
        let config = thresholds(&[("anycpu", 10.0, 60.0, 80.0)]);
        let alert = evaluate_alerts(&cpu_snapshot(50.0, &[95.0, 5.0, 70.0]), &config);

        assert_eq!(alert.level, AlertLevel::Fatal);
        assert!(alert.message.starts_with("cpu0:"));
        assert!(!alert.message.contains("cpu1"));
        assert!(!alert.message.contains("cpu2"));
    }

    #[test]
    fn filesystem_saturation_matches_mount_entry() {
        let mut snapshot = CounterSnapshot::default();
        snapshot.filesystems.insert(
            "/".to_string(),
            FsUsage {
                total_bytes: 100,
                avail_bytes: 5,
            },
        );
        let config = thresholds(&[("/", 0.0, 80.0, 90.0)]);

        let alert = evaluate_alerts(&snapshot, &config);
        assert_eq!(alert.level, AlertLevel::Fatal);
        assert!(alert.message.starts_with("/:"));
    }

    #[test]
    fn unconfigured_entities_do_not_alert() {
        let mut snapshot = cpu_snapshot(99.0, &[99.0]);
        snapshot.filesystems.insert(
            "/".to_string(),
            FsUsage {
                total_bytes: 100,
                avail_bytes: 1,
            },
        );

        let alert = evaluate_alerts(&snapshot, &ThresholdMap::new());
        assert_eq!(alert.level, AlertLevel::None);
        assert!(!alert.flagged);
    }

    #[test]
    fn first_tick_primes_then_rates_flow() {
        let collector = Collector::new(MockFs::typical_system(), "/proc");
        let mut inner = AgentInner::new(collector, ThresholdMap::new());

        assert_eq!(run_tick(&mut inner), TickOutcome::Primed);
        assert!(inner.baseline.is_some());
        assert_eq!(inner.tick_count, 1);

        // Counters unchanged between ticks: rates exist but are all zero
        let outcome = run_tick(&mut inner);
        assert_eq!(outcome, TickOutcome::Rated { devices: 2 });
        assert_eq!(inner.tick_count, 2);
    }

    #[test]
    fn collect_failure_keeps_loop_state_intact() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu  100 0 50 800 20 5 5 0 0 0\n");
        // No /proc/diskstats: collection fails
        let collector = Collector::new(fs, "/proc");
        let mut inner = AgentInner::new(collector, ThresholdMap::new());

        assert_eq!(run_tick(&mut inner), TickOutcome::CollectFailed);
        assert!(inner.baseline.is_none());
        assert_eq!(inner.tick_count, 0);
    }
}
