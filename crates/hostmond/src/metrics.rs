//! Prometheus metric families exposed on `/metrics`.

use std::collections::BTreeMap;

use prometheus::{Encoder, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

use hostmon_core::alert::AlertLevel;
use hostmon_core::model::{CpuBusy, DiskRates, FsUsage};

/// All metric families the agent publishes, registered on one registry.
pub(crate) struct AgentMetrics {
    registry: Registry,
    /// Cumulative I/O counters, incremented by per-tick deltas.
    disk_io: IntCounterVec,
    /// Per-device rates, set fresh each tick.
    disk_rates: GaugeVec,
    cpu_busy: GaugeVec,
    fs_used: GaugeVec,
    alerts: IntCounterVec,
    ticks: IntCounter,
    tick_skips: IntCounterVec,
}

impl AgentMetrics {
    pub(crate) fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let disk_io = IntCounterVec::new(
            Opts::new("disk_io_total", "Disk I/O observed by the agent").namespace("hostmon"),
            &["device", "measure", "operation"],
        )?;
        registry.register(Box::new(disk_io.clone()))?;

        let disk_rates = GaugeVec::new(
            Opts::new("disk_rates", "Disk I/O throughput per second").namespace("hostmon"),
            &["device", "unit", "operation"],
        )?;
        registry.register(Box::new(disk_rates.clone()))?;

        let cpu_busy = GaugeVec::new(
            Opts::new("cpu_busy_percent", "CPU busy percentage").namespace("hostmon"),
            &["core"],
        )?;
        registry.register(Box::new(cpu_busy.clone()))?;

        let fs_used = GaugeVec::new(
            Opts::new("fs_used_percent", "Filesystem used capacity percentage")
                .namespace("hostmon"),
            &["mount"],
        )?;
        registry.register(Box::new(fs_used.clone()))?;

        let alerts = IntCounterVec::new(
            Opts::new("alerts_total", "Threshold alerts raised").namespace("hostmon"),
            &["level"],
        )?;
        registry.register(Box::new(alerts.clone()))?;

        let ticks = IntCounter::with_opts(
            Opts::new("ticks_total", "Collection ticks attempted").namespace("hostmon"),
        )?;
        registry.register(Box::new(ticks.clone()))?;

        let tick_skips = IntCounterVec::new(
            Opts::new("ticks_skipped_total", "Collection ticks that emitted no rates")
                .namespace("hostmon"),
            &["reason"],
        )?;
        registry.register(Box::new(tick_skips.clone()))?;

        Ok(Self {
            registry,
            disk_io,
            disk_rates,
            cpu_busy,
            fs_used,
            alerts,
            ticks,
            tick_skips,
        })
    }

    /// Record one device's tick: deltas feed the counters, rates the gauges.
    pub(crate) fn record_disk(&self, device: &str, r: &DiskRates) {
        self.disk_io
            .with_label_values(&[device, "io_operations", "read"])
            .inc_by(r.reads_delta);
        self.disk_io
            .with_label_values(&[device, "io_operations", "write"])
            .inc_by(r.writes_delta);
        self.disk_io
            .with_label_values(&[device, "io_bytes", "read"])
            .inc_by(r.read_bytes_delta);
        self.disk_io
            .with_label_values(&[device, "io_bytes", "write"])
            .inc_by(r.write_bytes_delta);

        self.disk_rates
            .with_label_values(&[device, "iops", "read"])
            .set(r.riops);
        self.disk_rates
            .with_label_values(&[device, "iops", "write"])
            .set(r.wiops);
        self.disk_rates
            .with_label_values(&[device, "bytes_per_second", "read"])
            .set(r.read_bytes_s);
        self.disk_rates
            .with_label_values(&[device, "bytes_per_second", "write"])
            .set(r.write_bytes_s);
    }

    pub(crate) fn record_cpu(&self, cpus: &[CpuBusy]) {
        for cpu in cpus {
            let core = if cpu.core_id < 0 {
                "all".to_string()
            } else {
                cpu.core_id.to_string()
            };
            self.cpu_busy
                .with_label_values(&[core.as_str()])
                .set(cpu.busy_pct);
        }
    }

    pub(crate) fn record_filesystems(&self, filesystems: &BTreeMap<String, FsUsage>) {
        for (mount, usage) in filesystems {
            self.fs_used
                .with_label_values(&[mount.as_str()])
                .set(usage.used_percent());
        }
    }

    pub(crate) fn record_alert(&self, level: AlertLevel) {
        if level != AlertLevel::None {
            self.alerts.with_label_values(&[level.as_str()]).inc();
        }
    }

    pub(crate) fn inc_tick(&self) {
        self.ticks.inc();
    }

    pub(crate) fn inc_skip(&self, reason: &str) {
        self.tick_skips.with_label_values(&[reason]).inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    pub(crate) fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_families_show_up_in_exposition() {
        let metrics = AgentMetrics::new().unwrap();

        metrics.record_disk(
            "sda",
            &DiskRates {
                dt_secs: 1.0,
                reads_delta: 10,
                writes_delta: 5,
                read_bytes_delta: 4096,
                write_bytes_delta: 2048,
                riops: 10.0,
                wiops: 5.0,
                read_bytes_s: 4096.0,
                write_bytes_s: 2048.0,
            },
        );
        metrics.record_cpu(&[
            CpuBusy {
                core_id: -1,
                busy_pct: 42.0,
            },
            CpuBusy {
                core_id: 0,
                busy_pct: 60.0,
            },
        ]);
        let mut filesystems = BTreeMap::new();
        filesystems.insert(
            "/".to_string(),
            FsUsage {
                total_bytes: 100,
                avail_bytes: 25,
            },
        );
        metrics.record_filesystems(&filesystems);
        metrics.record_alert(AlertLevel::Warn);
        metrics.inc_tick();
        metrics.inc_skip("invalid_interval");

        let body = metrics.render().unwrap();
        assert!(body.contains("hostmon_disk_io_total"));
        assert!(body.contains("hostmon_disk_rates"));
        assert!(body.contains("hostmon_cpu_busy_percent"));
        assert!(body.contains("hostmon_fs_used_percent"));
        assert!(body.contains("hostmon_alerts_total"));
        assert!(body.contains("hostmon_ticks_total 1"));
        assert!(body.contains("device=\"sda\""));
        assert!(body.contains("core=\"all\""));
    }

    #[test]
    fn clean_alerts_are_not_counted() {
        let metrics = AgentMetrics::new().unwrap();
        metrics.record_alert(AlertLevel::None);

        let body = metrics.render().unwrap();
        assert!(!body.contains("level=\"none\""));
    }
}
