use crate::errors::RestoreError;
use crate::types::{Candidate, Outcome, RestoreCommand, ZrOpts};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use common::constants::{BACKUP_SUFFIX, DIFF};
use common::file_copier;
use common::types::Opts;
use log::debug;
use std::fs;
use std::io;
use std::process::Command;

/// Does whatever the user asked with their chosen candidate. Nothing is rolled back: if the
/// copy fails after the live file was removed, the live file stays gone.
///
pub fn execute(
    candidate: &Candidate,
    target: &Utf8Path,
    command: RestoreCommand,
    opts: &ZrOpts,
) -> anyhow::Result<Outcome> {
    match command {
        RestoreCommand::DiffOnly => {
            diff_files(&candidate.path, target)?;
            Ok(Outcome::Diffed)
        }
        RestoreCommand::WithBackup => {
            backup_target(target, opts)?;
            restore_in_place(candidate, target, opts)?;
            Ok(Outcome::Restored)
        }
        RestoreCommand::InPlace => {
            restore_in_place(candidate, target, opts)?;
            Ok(Outcome::Restored)
        }
    }
}

pub fn backup_path(file: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}.{}", file, BACKUP_SUFFIX))
}

fn backup_target(src: &Utf8Path, opts: &ZrOpts) -> anyhow::Result<()> {
    if fs::symlink_metadata(src).is_err() {
        debug!("{} does not exist, so there is nothing to back up", src);
        return Ok(());
    }

    let dest = backup_path(src);

    if fs::symlink_metadata(&dest).is_ok() {
        return Err(RestoreError::BackupTargetExists(dest).into());
    }

    if opts.noop {
        println!("{} -> {}", src, dest);
        return Ok(());
    }

    debug!("{} -> {}", src, dest);
    fs::rename(src, &dest).with_context(|| format!("failed to move {} to {}", src, dest))
}

fn restore_in_place(candidate: &Candidate, target: &Utf8Path, opts: &ZrOpts) -> anyhow::Result<()> {
    remove_target(target, opts)?;

    let copy_opts = Opts {
        noop: opts.noop,
        noclobber: false,
    };

    file_copier::copy_file(&candidate.path, target, &copy_opts)
        .with_context(|| format!("failed to copy {} to {}", candidate.path, target))?;

    Ok(())
}

// The target may be a directory ZFS left in place of the file, so it's cleared rather than
// overwritten.
fn remove_target(target: &Utf8Path, opts: &ZrOpts) -> anyhow::Result<()> {
    let metadata = match fs::symlink_metadata(target) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e).with_context(|| format!("failed to examine {}", target)),
    };

    if opts.noop {
        println!("remove {}", target);
        return Ok(());
    }

    debug!("removing {}", target);

    let removal = if metadata.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };

    removal.with_context(|| format!("failed to remove {}", target))
}

/// Shows what changed between the snapshot copy and the live file. Differences are not errors.
fn diff_files(source_file: &Utf8Path, target_file: &Utf8Path) -> anyhow::Result<()> {
    let mut cmd = Command::new(DIFF);
    cmd.arg(source_file).arg(target_file);

    debug!("{} {} {}", DIFF, source_file, target_file);

    let status = cmd
        .status()
        .with_context(|| format!("failed to run `{} {} {}`", DIFF, source_file, target_file))?;

    debug!("diff exited {}", status);
    Ok(())
}
