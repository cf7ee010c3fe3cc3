pub const DIFF: &str = "/usr/bin/diff";

/// Every ZFS dataset exposes its snapshots under this directory, relative to its mountpoint.
pub const SNAPSHOT_DIR: &str = ".zfs/snapshot";

pub const BACKUP_SUFFIX: &str = "orig";
