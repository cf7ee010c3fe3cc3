use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::os::unix::fs::MetadataExt;

/// The parts of a file's metadata which tell us whether two copies are the same.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileStat {
    pub size: u64,
    pub mtime: i64,
}

impl FileStat {
    /// `None` if the file isn't there, or vanished before we could look at it.
    pub fn of(file: &Utf8Path) -> Option<Self> {
        fs::metadata(file).ok().map(|m| Self {
            size: m.size(),
            mtime: m.mtime(),
        })
    }
}

/// The live file the user wants back.
#[derive(Clone, Debug)]
pub struct TargetFile {
    pub path: Utf8PathBuf,
    pub stat: Option<FileStat>,
}

impl TargetFile {
    pub fn new(path: Utf8PathBuf) -> Self {
        let stat = FileStat::of(&path);
        Self { path, stat }
    }
}

/// A copy of the target file found in a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub snapname: String,
    pub path: Utf8PathBuf,
    pub stat: Option<FileStat>,
}

impl Candidate {
    pub fn mtime(&self) -> Option<i64> {
        self.stat.map(|s| s.mtime)
    }
}

pub type Candidates = Vec<Candidate>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestoreCommand {
    InPlace,
    WithBackup,
    DiffOnly,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub command: RestoreCommand,
}

/// How a candidate compares with the live file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Likeness {
    Identical,
    SameSize,
    Different,
    Unknown,
}

/// What became of one file argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Restored,
    Diffed,
    Skipped,
    Quit,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ZrOpts {
    pub auto: bool,
    pub noop: bool,
}

/// What the user asked for, if anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    Take(Selection),
    Skip,
    Quit,
}
