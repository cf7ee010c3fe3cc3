use crate::errors::RestoreError;
use crate::types::{Candidate, Candidates, FileStat, TargetFile};
use anyhow::Context;
use camino::Utf8Path;
use common::zfs_info::{self, MountBoundary};
use common::zfs_file;
use log::{debug, warn};

/// Turns a user-supplied path into an absolute one. The file needn't exist, because it may
/// well have just been deleted, but the directory it lives in must.
///
pub fn resolve_target(file: &str) -> Result<TargetFile, RestoreError> {
    if file.is_empty() {
        return Err(RestoreError::EmptyPath);
    }

    let file = Utf8Path::new(file);

    let path =
        zfs_info::canonical_file(file).map_err(|source| RestoreError::ParentNotFound {
            path: file.to_path_buf(),
            source,
        })?;

    Ok(TargetFile::new(path))
}

/// Finds every copy of the target file in the snapshots of the dataset which holds it.
pub fn locate(target: &TargetFile, boundary: &impl MountBoundary) -> anyhow::Result<Candidates> {
    if target.path.is_dir() && boundary.is_mountpoint(&target.path)? {
        return Err(RestoreError::DatasetRoot(target.path.clone()).into());
    }

    let target_dir = zfs_info::parent_dir(&target.path);
    let filesystem_root = zfs_info::dataset_root(target_dir, boundary)
        .with_context(|| format!("failed to find dataset containing {}", target.path))?;

    debug!("{} is in dataset mounted at {}", target.path, filesystem_root);
    candidates(&filesystem_root, &target.path)
}

pub fn candidates(filesystem_root: &Utf8Path, file: &Utf8Path) -> anyhow::Result<Candidates> {
    let relative_path = file
        .strip_prefix(filesystem_root)
        .with_context(|| format!("{} is not under {}", file, filesystem_root))?;

    // Every snapshot root would match, and restoring one means clearing the whole dataset.
    if relative_path.as_str().is_empty() {
        return Err(RestoreError::DatasetRoot(file.to_path_buf()).into());
    }

    let snapshot_dirs = zfs_file::snapshot_dirs(filesystem_root)
        .with_context(|| format!("failed to list snapshots under {}", filesystem_root))?
        .ok_or_else(|| RestoreError::NoSnapshotIndex(filesystem_root.to_path_buf()))?;

    debug!("Found {} snapshots.", snapshot_dirs.len());

    let ret: Candidates = snapshot_dirs
        .iter()
        .filter_map(|snapdir| candidate_in(snapdir, relative_path))
        .collect();

    if ret.is_empty() {
        return Err(RestoreError::NoCandidates {
            examined: snapshot_dirs.len(),
        }
        .into());
    }

    Ok(ret)
}

fn candidate_in(snapdir: &Utf8Path, relative_path: &Utf8Path) -> Option<Candidate> {
    let path = snapdir.join(relative_path);

    if !path.exists() {
        debug!("{}: no candidate file", path);
        return None;
    }

    debug!("{}: found candidate file", path);

    // It was there a moment ago. If it's gone now we still offer it, without details.
    let stat = FileStat::of(&path);
    if stat.is_none() {
        warn!("Failed to get metadata for {}", path);
    }

    Some(Candidate {
        snapname: snapdir.file_name().unwrap_or(snapdir.as_str()).to_string(),
        path,
        stat,
    })
}
