//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the collector to work with both the real
//! `/proc` filesystem on Linux and mock implementations for testing on other
//! platforms or in CI.

use std::io;
use std::path::{Path, PathBuf};

use crate::model::FsUsage;

/// Abstraction for filesystem operations.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;

    /// Reports capacity usage of the filesystem mounted at `path`.
    fn fs_usage(&self, path: &Path) -> io::Result<FsUsage>;
}

/// Real filesystem implementation that delegates to `std::fs` and `statvfs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path)?;
        let mut paths = Vec::new();
        for entry in entries {
            paths.push(entry?.path());
        }
        Ok(paths)
    }

    #[cfg(unix)]
    fn fs_usage(&self, path: &Path) -> io::Result<FsUsage> {
        let stat = nix::sys::statvfs::statvfs(path)
            .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
        let frsize = stat.fragment_size() as u64;
        Ok(FsUsage {
            total_bytes: frsize * stat.blocks() as u64,
            avail_bytes: frsize * stat.blocks_available() as u64,
        })
    }

    #[cfg(not(unix))]
    fn fs_usage(&self, _path: &Path) -> io::Result<FsUsage> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "statvfs is only available on unix",
        ))
    }
}
