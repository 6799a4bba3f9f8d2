//! System collector for gathering host counters from `/proc/`.

use std::collections::BTreeMap;
use std::path::Path;

use crate::collector::procfs::parser::{
    CpuTicks, DiskStat, parse_diskstats, parse_mounts, parse_stat_cpus,
};
use crate::collector::traits::FileSystem;
use crate::model::FsUsage;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// I/O error reading a `/proc` file.
    Io(std::io::Error),
    /// Parse error in a `/proc` file.
    Parse(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {}

impl From<std::io::Error> for CollectError {
    fn from(e: std::io::Error) -> Self {
        CollectError::Io(e)
    }
}

/// Filesystem types that never carry user data; their mounts are skipped
/// for usage sampling.
const PSEUDO_FS_TYPES: &[&str] = &[
    "autofs",
    "binfmt_misc",
    "bpf",
    "cgroup",
    "cgroup2",
    "configfs",
    "debugfs",
    "devpts",
    "devtmpfs",
    "fusectl",
    "hugetlbfs",
    "mqueue",
    "nsfs",
    "overlay",
    "proc",
    "pstore",
    "ramfs",
    "rpc_pipefs",
    "securityfs",
    "squashfs",
    "sysfs",
    "tmpfs",
    "tracefs",
];

/// Filter for block devices worth rating.
///
/// Skips loop/ram devices and partitions (name ending in a digit). NVMe
/// whole devices also end in a digit (`nvme0n1`) and are exempted; their
/// partitions carry a `p` suffix (`nvme0n1p1`) and are skipped.
pub fn is_relevant_disk(device: &str) -> bool {
    if device.starts_with("loop") || device.starts_with("ram") || device.starts_with("zram") {
        return false;
    }
    if device.starts_with("nvme") {
        return !device.contains('p');
    }
    !device
        .chars()
        .last()
        .is_some_and(|c| c.is_ascii_digit())
}

/// Collects host-wide counters from `/proc/`.
pub struct SystemCollector<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> SystemCollector<F> {
    /// Creates a new system collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Collects disk I/O statistics from `/proc/diskstats`.
    pub fn collect_diskstats(&self) -> Result<Vec<DiskStat>, CollectError> {
        let path = format!("{}/diskstats", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        parse_diskstats(&content).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects cumulative CPU ticks from `/proc/stat`.
    ///
    /// Returns the aggregate entry first (`cpu_id == -1`), then per-core
    /// entries.
    pub fn collect_cpu_ticks(&self) -> Result<Vec<CpuTicks>, CollectError> {
        let path = format!("{}/stat", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;
        parse_stat_cpus(&content).map_err(|e| CollectError::Parse(e.message))
    }

    /// Collects capacity usage for every real (non-pseudo) mounted
    /// filesystem listed in `/proc/mounts`.
    ///
    /// Mounts whose usage cannot be statted (stale NFS handles, permission
    /// denied) are skipped for the tick rather than failing the collection.
    pub fn collect_filesystems(&self) -> Result<BTreeMap<String, FsUsage>, CollectError> {
        let path = format!("{}/mounts", self.proc_path);
        let content = self.fs.read_to_string(Path::new(&path))?;

        let mut filesystems = BTreeMap::new();
        for mount in parse_mounts(&content) {
            if PSEUDO_FS_TYPES.contains(&mount.fs_type.as_str()) {
                continue;
            }
            if let Ok(usage) = self.fs.fs_usage(Path::new(&mount.mount_point)) {
                filesystems.insert(mount.mount_point, usage);
            }
        }

        Ok(filesystems)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    #[test]
    fn test_collect_diskstats() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let disks = collector.collect_diskstats().unwrap();
        assert_eq!(disks.len(), 4);

        assert_eq!(disks[0].device, "sda");
        assert_eq!(disks[0].reads, 12345);
        assert_eq!(disks[0].read_sectors, 987654);
        assert_eq!(disks[0].writes, 6789);
        assert_eq!(disks[0].write_sectors, 456789);
    }

    #[test]
    fn test_collect_cpu_ticks() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let cpus = collector.collect_cpu_ticks().unwrap();

        // typical_system has aggregate + 4 CPUs
        assert_eq!(cpus.len(), 5);
        assert_eq!(cpus[0].cpu_id, -1);
        assert_eq!(cpus[0].user, 10000);
        assert_eq!(cpus[1].cpu_id, 0);
    }

    #[test]
    fn test_collect_filesystems_skips_pseudo_mounts() {
        let fs = MockFs::typical_system();
        let collector = SystemCollector::new(fs, "/proc");

        let filesystems = collector.collect_filesystems().unwrap();

        assert!(filesystems.contains_key("/"));
        assert!(filesystems.contains_key("/var"));
        assert!(!filesystems.contains_key("/proc"));
        assert!(!filesystems.contains_key("/run"));
    }

    #[test]
    fn test_collect_filesystems_skips_unstattable_mounts() {
        let mut fs = MockFs::typical_system();
        // A mount listed in /proc/mounts but with no usage entry
        fs.add_file(
            "/proc/mounts",
            "\
/dev/sda1 / ext4 rw,relatime 0 0
/dev/sdc1 /mnt/stale ext4 rw 0 0
",
        );

        let collector = SystemCollector::new(fs, "/proc");
        let filesystems = collector.collect_filesystems().unwrap();

        assert!(filesystems.contains_key("/"));
        assert!(!filesystems.contains_key("/mnt/stale"));
    }

    #[test]
    fn test_is_relevant_disk() {
        assert!(is_relevant_disk("sda"));
        assert!(is_relevant_disk("vdb"));
        assert!(is_relevant_disk("nvme0n1"));

        assert!(!is_relevant_disk("sda1"));
        assert!(!is_relevant_disk("nvme0n1p2"));
        assert!(!is_relevant_disk("loop0"));
        assert!(!is_relevant_disk("ram0"));
        assert!(!is_relevant_disk("zram0"));
    }
}
