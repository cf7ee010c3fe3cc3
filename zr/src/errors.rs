use camino::Utf8PathBuf;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("no file given")]
    EmptyPath,
    #[error("cannot find directory containing {path}")]
    ParentNotFound {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is the root of its dataset, and cannot be restored")]
    DatasetRoot(Utf8PathBuf),
    #[error("no snapshots found under {0}")]
    NoSnapshotIndex(Utf8PathBuf),
    #[error("no matches found in {examined} snapshot(s)")]
    NoCandidates { examined: usize },
    #[error("every snapshot copy is identical to the live file")]
    AllIdentical,
    #[error("invalid selection '{0}'")]
    InvalidSelection(String),
    #[error("unknown command '{0}'")]
    UnknownCommand(char),
    #[error("backup target {0} exists")]
    BackupTargetExists(Utf8PathBuf),
}
