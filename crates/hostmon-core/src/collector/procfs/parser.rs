//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of various `/proc` files
//! into structured data. They are designed to be easily testable with string
//! inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// Parsed data for one device line of `/proc/diskstats`.
///
/// Sector counts are in 512-byte units regardless of the device's logical
/// block size (kernel convention).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskStat {
    pub major: u32,
    pub minor: u32,
    pub device: String,
    /// Reads completed (field 4).
    pub reads: u64,
    /// Sectors read (field 6).
    pub read_sectors: u64,
    /// Writes completed (field 8).
    pub writes: u64,
    /// Sectors written (field 10).
    pub write_sectors: u64,
}

/// Parses `/proc/diskstats` content.
///
/// Each line: `major minor device reads r_merged r_sectors r_time writes
/// w_merged w_sectors w_time ...`. Lines with fewer than 11 fields are
/// rejected — the kernel has emitted at least that many since 2.6.
pub fn parse_diskstats(content: &str) -> Result<Vec<DiskStat>, ParseError> {
    let mut disks = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 11 {
            return Err(ParseError::new(format!(
                "diskstats line too short: expected 11+ fields, got {}",
                fields.len()
            )));
        }

        let parse_u64 = |idx: usize, name: &str| -> Result<u64, ParseError> {
            fields[idx]
                .parse()
                .map_err(|_| ParseError::new(format!("invalid {} in diskstats", name)))
        };

        disks.push(DiskStat {
            major: parse_u64(0, "major")? as u32,
            minor: parse_u64(1, "minor")? as u32,
            device: fields[2].to_string(),
            reads: parse_u64(3, "reads")?,
            read_sectors: parse_u64(5, "read_sectors")?,
            writes: parse_u64(7, "writes")?,
            write_sectors: parse_u64(9, "write_sectors")?,
        });
    }

    Ok(disks)
}

/// Cumulative scheduler ticks for one CPU from `/proc/stat`.
///
/// `cpu_id == -1` is the aggregate line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTicks {
    pub cpu_id: i16,
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
}

impl CpuTicks {
    /// Total ticks across all accounted states.
    pub fn total(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.idle
            + self.iowait
            + self.irq
            + self.softirq
            + self.steal
    }
}

/// Parses the `cpu*` lines of `/proc/stat`.
///
/// Returns the aggregate line first (`cpu_id == -1`), then one entry per
/// core. Non-cpu lines (intr, ctxt, btime, ...) are ignored.
pub fn parse_stat_cpus(content: &str) -> Result<Vec<CpuTicks>, ParseError> {
    let mut cpus = Vec::new();

    for line in content.lines() {
        let Some(rest) = line.strip_prefix("cpu") else {
            continue;
        };
        let fields: Vec<&str> = rest.split_whitespace().collect();
        // "cpu" aggregate has no id before the first field; "cpuN" does
        let (cpu_id, values) = if rest.starts_with(char::is_whitespace) {
            (-1i16, &fields[..])
        } else {
            let id: i16 = fields
                .first()
                .and_then(|s| s.parse().ok())
                .ok_or_else(|| ParseError::new("invalid cpu id in stat"))?;
            (id, &fields[1..])
        };

        if values.len() < 4 {
            return Err(ParseError::new(format!(
                "cpu line too short: expected 4+ fields, got {}",
                values.len()
            )));
        }

        let at = |idx: usize| -> u64 { values.get(idx).and_then(|s| s.parse().ok()).unwrap_or(0) };

        cpus.push(CpuTicks {
            cpu_id,
            user: at(0),
            nice: at(1),
            system: at(2),
            idle: at(3),
            iowait: at(4),
            irq: at(5),
            softirq: at(6),
            steal: at(7),
        });
    }

    Ok(cpus)
}

/// One entry of `/proc/mounts`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MountEntry {
    pub device: String,
    pub mount_point: String,
    pub fs_type: String,
}

/// Parses `/proc/mounts` content.
///
/// Malformed lines are skipped. Octal escapes in mount points (`\040` for
/// space, `\011` for tab) are decoded.
pub fn parse_mounts(content: &str) -> Vec<MountEntry> {
    let mut mounts = Vec::new();

    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let (Some(device), Some(mount_point), Some(fs_type)) =
            (fields.next(), fields.next(), fields.next())
        else {
            continue;
        };
        mounts.push(MountEntry {
            device: device.to_string(),
            mount_point: unescape_mount_path(mount_point),
            fs_type: fs_type.to_string(),
        });
    }

    mounts
}

fn unescape_mount_path(path: &str) -> String {
    path.replace("\\040", " ")
        .replace("\\011", "\t")
        .replace("\\134", "\\")
}
