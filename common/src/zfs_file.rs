//! Knowledge of how ZFS lays out snapshots beneath a dataset's mountpoint.
//!
use crate::constants::SNAPSHOT_DIR;
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use std::io;

/// The directory which holds all the snapshots of the dataset mounted at `dataset_root`.
pub fn snapshot_root(dataset_root: &Utf8Path) -> Utf8PathBuf {
    dataset_root.join(SNAPSHOT_DIR)
}

/// Every snapshot directory of the dataset, in whatever order the filesystem lists them.
/// `None` means the dataset has no snapshot directory at all.
///
pub fn snapshot_dirs(dataset_root: &Utf8Path) -> io::Result<Option<Vec<Utf8PathBuf>>> {
    let snapshot_root = snapshot_root(dataset_root);

    if !snapshot_root.is_dir() {
        return Ok(None);
    }

    let dirs = snapshot_root
        .read_dir_utf8()?
        .map(|entry| entry.map(|e| e.path().to_path_buf()))
        .collect::<io::Result<Vec<_>>>()?;

    Ok(Some(dirs))
}

// Index of the `.zfs` component in a `.zfs/snapshot/<name>` sequence.
fn snapshot_marker(components: &[Utf8Component]) -> Option<usize> {
    components
        .windows(3)
        .position(|w| w[0].as_str() == ".zfs" && w[1].as_str() == "snapshot")
}

pub fn in_snapshot(file: &Utf8Path) -> bool {
    let components: Vec<_> = file.components().collect();
    snapshot_marker(&components).is_some()
}

/// The name of the snapshot holding `file`, if it is in one.
pub fn snapshot_name(file: &Utf8Path) -> Option<String> {
    let components: Vec<_> = file.components().collect();
    let marker = snapshot_marker(&components)?;
    Some(components[marker + 2].as_str().to_string())
}

/// Where a file inside a snapshot lives on the live filesystem.
pub fn live_path(file: &Utf8Path) -> Option<Utf8PathBuf> {
    let components: Vec<_> = file.components().collect();
    let marker = snapshot_marker(&components)?;

    let ret = components
        .iter()
        .enumerate()
        .filter(|(i, _)| *i < marker || *i > marker + 2)
        .map(|(_, c)| c.as_str())
        .collect();

    Some(ret)
}
