use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use std::os::unix::fs::MetadataExt;

/// Knows whether or not a directory is the point at which a filesystem is mounted.
pub trait MountBoundary {
    fn is_mountpoint(&self, dir: &Utf8Path) -> io::Result<bool>;
}

/// Recognises a mountpoint because it lives on a different device from its parent.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceBoundary;

impl MountBoundary for DeviceBoundary {
    fn is_mountpoint(&self, dir: &Utf8Path) -> io::Result<bool> {
        match dir.parent() {
            None => Ok(true),
            Some(parent) => {
                let path_metadata = fs::metadata(dir)?;
                let parent_metadata = fs::metadata(parent)?;
                Ok(path_metadata.dev() != parent_metadata.dev())
            }
        }
    }
}

/// Walks up from `dir` until it finds the mountpoint of the filesystem which contains it. `/`
/// is always a mountpoint, so an absolute path always resolves.
///
pub fn dataset_root(dir: &Utf8Path, boundary: &impl MountBoundary) -> io::Result<Utf8PathBuf> {
    if dir.is_relative() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot find dataset root of relative path {}", dir),
        ));
    }

    for ancestor in dir.ancestors() {
        if ancestor.parent().is_none() || boundary.is_mountpoint(ancestor)? {
            return Ok(ancestor.to_path_buf());
        }
    }

    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("failed to find root of {}", dir),
    ))
}

/// The directory which would hold `file`, whether or not `file` itself exists. A bare filename
/// lives in the current directory.
pub fn parent_dir(file: &Utf8Path) -> &Utf8Path {
    match file.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        Some(_) => Utf8Path::new("."),
        None => file,
    }
}

/// We need to canonicalize the target file, whether it exists or not. Its parent directory
/// must exist though.
///
pub fn canonical_file(file: &Utf8Path) -> io::Result<Utf8PathBuf> {
    match file.file_name() {
        Some(name) => Ok(parent_dir(file).canonicalize_utf8()?.join(name)),
        None => file.canonicalize_utf8(),
    }
}
