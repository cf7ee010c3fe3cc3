use crate::types::Opts;
use camino::Utf8Path;
use filetime::{FileTime, set_file_times, set_symlink_file_times};
use log::debug;
use std::fs;
use std::io;
use std::os::unix::fs::symlink;

/// Recursively copies files and directory trees, carrying permissions and timestamps across.
/// Symlinks are recreated, never followed. Merges with existing targets, leaving existing files
/// alone if opts.noclobber is set. Returns the number of bytes copied.
pub fn copy_file(src: &Utf8Path, dest: &Utf8Path, opts: &Opts) -> io::Result<u64> {
    let file_type = fs::symlink_metadata(src)?.file_type();

    if file_type.is_symlink() {
        copy_link(src, dest, opts)
    } else if file_type.is_dir() {
        copy_dir(src, dest, opts)
    } else {
        copy_file_action(src, dest, opts)
    }
}

// Unlike Path::exists(), true for a dangling link.
fn is_present(path: &Utf8Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

fn is_link(path: &Utf8Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.file_type().is_symlink())
}

fn copy_dir(src: &Utf8Path, dest: &Utf8Path, opts: &Opts) -> io::Result<u64> {
    if is_link(dest) {
        if opts.noclobber {
            debug!("{} exists and noclobber is set", dest);
            return Ok(0);
        }

        if opts.noop {
            println!("remove {}", dest);
        } else {
            fs::remove_file(dest)?;
        }
    }

    if !is_present(dest) || is_link(dest) {
        if opts.noop {
            println!("mkdir {}", dest);
        } else {
            debug!("mkdir {}", dest);
            fs::create_dir_all(dest)?;
        }
    }

    let mut copied = 0;

    for f in src.read_dir_utf8()? {
        let f = f?;
        copied += copy_file(f.path(), &dest.join(f.file_name()), opts)?;
    }

    if !opts.noop {
        preserve_metadata(src, dest)?;
    }

    Ok(copied)
}

fn copy_file_action(src: &Utf8Path, dest: &Utf8Path, opts: &Opts) -> io::Result<u64> {
    if is_present(dest) && opts.noclobber {
        debug!("{} exists and noclobber is set", dest);
        return Ok(0);
    }

    if opts.noop {
        println!("{} -> {}", src, dest);
        return Ok(0);
    }

    // fs::copy would write through a link
    if is_link(dest) {
        fs::remove_file(dest)?;
    }

    debug!("{} -> {}", src, dest);
    let copied = fs::copy(src, dest)?;
    preserve_metadata(src, dest)?;
    Ok(copied)
}

fn copy_link(src: &Utf8Path, dest: &Utf8Path, opts: &Opts) -> io::Result<u64> {
    if is_present(dest) && opts.noclobber {
        debug!("{} exists and noclobber is set", dest);
        return Ok(0);
    }

    let link_target = fs::read_link(src)?;

    if opts.noop {
        println!("{} -> {} (link to {})", src, dest, link_target.display());
        return Ok(0);
    }

    if is_present(dest) && !fs::symlink_metadata(dest)?.is_dir() {
        fs::remove_file(dest)?;
    }

    debug!("{} -> {} (link to {})", src, dest, link_target.display());
    symlink(&link_target, dest)?;

    let metadata = fs::symlink_metadata(src)?;
    set_symlink_file_times(
        dest,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )?;

    Ok(0)
}

/// Gives `dest` the permissions and access and modification times of `src`.
pub fn preserve_metadata(src: &Utf8Path, dest: &Utf8Path) -> io::Result<()> {
    let metadata = fs::metadata(src)?;
    fs::set_permissions(dest, metadata.permissions())?;
    set_file_times(
        dest,
        FileTime::from_last_access_time(&metadata),
        FileTime::from_last_modification_time(&metadata),
    )
}
