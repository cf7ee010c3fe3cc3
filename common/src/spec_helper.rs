//! Builders for the fake datasets which the tests in all the tools work with. A fake dataset is
//! an ordinary directory with a `.zfs/snapshot/<name>` tree underneath it, and a `FixedMounts`
//! which says it is a mountpoint.
//!
use crate::zfs_file::snapshot_root;
use crate::zfs_info::MountBoundary;
use camino::{Utf8Path, Utf8PathBuf};
use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::io;

/// Treats only the listed directories, and `/`, as mountpoints.
#[derive(Clone, Debug, Default)]
pub struct FixedMounts(pub Vec<Utf8PathBuf>);

impl MountBoundary for FixedMounts {
    fn is_mountpoint(&self, dir: &Utf8Path) -> io::Result<bool> {
        Ok(dir.as_str() == "/" || self.0.iter().any(|m| m == dir))
    }
}

/// Writes `content` to `file`, creating any missing directories, and backdates its mtime.
pub fn write_file(file: &Utf8Path, content: &str, mtime: i64) -> io::Result<()> {
    if let Some(parent) = file.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(file, content)?;
    set_file_mtime(file, FileTime::from_unix_time(mtime, 0))
}

/// Puts a file at `relative_path` in snapshot `snapname` of the fake dataset at `root`.
pub fn write_snapshot_file(
    root: &Utf8Path,
    snapname: &str,
    relative_path: &str,
    content: &str,
    mtime: i64,
) -> io::Result<Utf8PathBuf> {
    let file = snapshot_root(root).join(snapname).join(relative_path);
    write_file(&file, content, mtime)?;
    Ok(file)
}
