//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` filesystem states for testing
//! various system conditions. `io_burst` pairs with `typical_system` as the
//! "one tick later" state for delta and rate tests.

use super::filesystem::MockFs;

impl MockFs {
    /// Creates a typical idle-ish system: two whole disks plus a partition,
    /// four cores, a root and a /var mount.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 12345 100 987654 5000 6789 50 456789 3000 0 4000 8000 0 0 0 0
   8       1 sda1 10000 80 800000 4000 5000 40 400000 2500 0 3500 6500 0 0 0 0
 259       0 nvme0n1 50000 200 2000000 10000 30000 150 1500000 8000 5 15000 18000 0 0 0 0
   7       0 loop0 100 0 800 10 0 0 0 0 0 10 10 0 0 0 0
",
        );

        fs.add_file(
            "/proc/mounts",
            "\
/dev/sda1 / ext4 rw,relatime 0 0
/dev/nvme0n1 /var ext4 rw,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
sysfs /sys sysfs rw,nosuid,nodev,noexec,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
",
        );

        // 100 GB root at 40% used, 500 GB /var at 20% used
        fs.add_fs_usage("/", 100_000_000_000, 60_000_000_000);
        fs.add_fs_usage("/var", 500_000_000_000, 400_000_000_000);

        fs
    }

    /// The typical system one tick later, after a burst of I/O and CPU work.
    ///
    /// Every cumulative counter has advanced relative to `typical_system`.
    pub fn io_burst() -> Self {
        let mut fs = Self::typical_system();

        fs.add_file(
            "/proc/stat",
            "\
cpu  16000 600 5000 82000 1400 300 200 0 0 0
cpu0 4000 150 1250 20500 350 75 50 0 0 0
cpu1 4000 150 1250 20500 350 75 50 0 0 0
cpu2 4000 150 1250 20500 350 75 50 0 0 0
cpu3 4000 150 1250 20500 350 75 50 0 0 0
intr 1200000 60 0 0 0 0 0 0 0 1 0 0 0 120 0 0 1200
ctxt 600000
btime 1700000000
processes 11000
procs_running 5
procs_blocked 1
",
        );

        fs.add_file(
            "/proc/diskstats",
            "\
   8       0 sda 22345 180 1987654 9000 16789 90 1456789 6000 0 7000 15000 0 0 0 0
   8       1 sda1 18000 140 1600000 7000 14000 70 1300000 5000 0 6000 12000 0 0 0 0
 259       0 nvme0n1 90000 350 4000000 18000 70000 280 3500000 15000 2 25000 32000 0 0 0 0
   7       0 loop0 100 0 800 10 0 0 0 0 0 10 10 0 0 0 0
",
        );

        fs
    }

    /// Creates a system under high CPU load (pairs with `typical_system`
    /// as the later sample: nearly all new ticks are busy).
    pub fn high_cpu_load() -> Self {
        let mut fs = Self::typical_system();

        fs.add_file(
            "/proc/stat",
            "\
cpu  80000 1000 15000 81000 1500 1000 500 0 0 0
cpu0 20000 250 3750 20250 375 250 125 0 0 0
cpu1 20000 250 3750 20250 375 250 125 0 0 0
cpu2 20000 250 3750 20250 375 250 125 0 0 0
cpu3 20000 250 3750 20250 375 250 125 0 0 0
intr 5000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 5000
ctxt 2000000
btime 1700000000
processes 50000
procs_running 8
procs_blocked 2
",
        );

        fs
    }

    /// Creates a system whose root filesystem is nearly full.
    pub fn nearly_full_filesystem() -> Self {
        let mut fs = Self::typical_system();
        // 100 GB root with 4 GB left
        fs.add_fs_usage("/", 100_000_000_000, 4_000_000_000);
        fs
    }
}
