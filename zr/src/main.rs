mod errors;
mod finder;
mod interrupt;
mod restore;
mod types;
mod user_interaction;

use crate::types::{Choice, Outcome, TargetFile, ZrOpts};
use crate::user_interaction::{Colours, Palette};
use anyhow::Context;
use clap::Parser;
use common::logging;
use common::zfs_info::{DeviceBoundary, MountBoundary};
use log::{debug, warn};
use std::io::{self, BufRead, Write};

#[derive(Parser)]
#[clap(version, about = "Restores files from ZFS snapshots")]
struct Cli {
    /// Print what would happen, without doing it
    #[clap(short, long)]
    noop: bool,
    /// Be verbose
    #[clap(short, long)]
    verbose: bool,
    /// Automatically recover the newest backup
    #[clap(short, long)]
    auto: bool,
    /// File(s) to restore
    #[clap(required = true, num_args = 1..)]
    file_list: Vec<String>,
}

/// Finds, offers, and restores snapshot copies of a single file.
fn restore_file(
    file: &str,
    opts: &ZrOpts,
    boundary: &impl MountBoundary,
    input: &mut impl BufRead,
    out: &mut impl Write,
    palette: &impl Palette,
) -> anyhow::Result<Outcome> {
    let target =
        finder::resolve_target(file).with_context(|| format!("cannot restore {}", file))?;

    restore_target(&target, opts, boundary, input, out, palette)
        .with_context(|| format!("cannot restore {}", target.path))
}

fn restore_target(
    target: &TargetFile,
    opts: &ZrOpts,
    boundary: &impl MountBoundary,
    input: &mut impl BufRead,
    out: &mut impl Write,
    palette: &impl Palette,
) -> anyhow::Result<Outcome> {
    let mut candidates = finder::locate(target, boundary)?;
    user_interaction::sort_candidates(&mut candidates);

    let selection = match user_interaction::choose(
        opts.auto,
        target.stat.as_ref(),
        &candidates,
        input,
        out,
        palette,
    )? {
        Choice::Take(selection) => selection,
        Choice::Skip => return Ok(Outcome::Skipped),
        Choice::Quit => return Ok(Outcome::Quit),
    };

    // parse_choice has already range-checked the index
    let candidate = &candidates[selection.index];
    debug!("restoring {} from {}", target.path, candidate.snapname);
    restore::execute(candidate, &target.path, selection.command, opts)
}

/// Works through every file, carrying on past failures. Returns the exit status: the number of
/// failures, or zero if the user bailed out.
fn run(
    file_list: &[String],
    opts: &ZrOpts,
    boundary: &impl MountBoundary,
    input: &mut impl BufRead,
    out: &mut impl Write,
    palette: &impl Palette,
) -> i32 {
    let mut errs: i32 = 0;

    for file in file_list {
        match restore_file(file, opts, boundary, input, out, palette) {
            Ok(Outcome::Quit) => return 0,
            Ok(outcome) => debug!("{}: {:?}", file, outcome),
            Err(e) => {
                eprintln!("ERROR: {:#}", e);
                errs += 1;
            }
        }
    }

    if errs > 0 {
        eprintln!("Encountered {} error(s)", errs);
    }

    errs.min(255)
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = interrupt::exit_on_interrupt() {
        warn!("Cannot trap interrupts: {}", e);
    }

    let opts = ZrOpts {
        auto: cli.auto,
        noop: cli.noop,
    };

    let stdin = io::stdin();
    let status = run(
        &cli.file_list,
        &opts,
        &DeviceBoundary,
        &mut stdin.lock(),
        &mut io::stdout(),
        &Colours,
    );

    std::process::exit(status);
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::errors::RestoreError;
    use crate::restore::backup_path;
    use crate::types::FileStat;
    use crate::user_interaction::Plain;
    use camino::Utf8PathBuf;
    use camino_tempfile::{Utf8TempDir, tempdir};
    use common::spec_helper::{FixedMounts, write_file, write_snapshot_file};
    use std::fs;
    use std::io::{Cursor, sink};

    const T0: i64 = 1_700_000_000;
    const T1: i64 = T0 + 86_400;

    struct Dataset {
        _tmp: Utf8TempDir,
        root: Utf8PathBuf,
        mounts: FixedMounts,
    }

    // report.txt is 100 bytes at T0. Monday has an identical copy, Tuesday's is bigger and
    // newer.
    fn report_dataset() -> Dataset {
        let tmp = tempdir().unwrap();
        let root = tmp.path().canonicalize_utf8().unwrap();
        let live = "x".repeat(100);
        let tuesday = "y".repeat(120);

        write_file(&root.join("report.txt"), &live, T0).unwrap();
        write_snapshot_file(&root, "monday", "report.txt", &live, T0).unwrap();
        write_snapshot_file(&root, "tuesday", "report.txt", &tuesday, T1).unwrap();

        Dataset {
            _tmp: tmp,
            mounts: FixedMounts(vec![root.clone()]),
            root,
        }
    }

    fn restore_one(
        dataset: &Dataset,
        file: &str,
        auto: bool,
        answer: &str,
    ) -> anyhow::Result<Outcome> {
        let opts = ZrOpts { auto, noop: false };
        restore_file(
            file,
            &opts,
            &dataset.mounts,
            &mut Cursor::new(answer.to_string()),
            &mut sink(),
            &Plain,
        )
    }

    #[test]
    fn test_auto_restores_newest() {
        let dataset = report_dataset();
        let file = dataset.root.join("report.txt");

        assert_eq!(
            Outcome::Restored,
            restore_one(&dataset, file.as_str(), true, "").unwrap()
        );
        assert_eq!("y".repeat(120), fs::read_to_string(&file).unwrap());
        assert_eq!(
            Some(FileStat {
                size: 120,
                mtime: T1
            }),
            FileStat::of(&file)
        );
    }

    #[test]
    fn test_restore_then_all_identical() {
        let dataset = report_dataset();
        let file = dataset.root.join("report.txt");
        fs::remove_file(dataset.root.join(".zfs/snapshot/monday/report.txt")).unwrap();

        restore_one(&dataset, file.as_str(), true, "").unwrap();

        let err = restore_one(&dataset, file.as_str(), true, "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RestoreError>(),
            Some(RestoreError::AllIdentical)
        ));
    }

    #[test]
    fn test_interactive_backup() {
        let dataset = report_dataset();
        let file = dataset.root.join("report.txt");

        // newest first, so monday is 1
        assert_eq!(
            Outcome::Restored,
            restore_one(&dataset, file.as_str(), false, "0k\n").unwrap()
        );
        assert_eq!("y".repeat(120), fs::read_to_string(&file).unwrap());
        assert_eq!(
            "x".repeat(100),
            fs::read_to_string(backup_path(&file)).unwrap()
        );
    }

    #[test]
    fn test_interactive_skip_and_quit() {
        let dataset = report_dataset();
        let file = dataset.root.join("report.txt");

        assert_eq!(
            Outcome::Skipped,
            restore_one(&dataset, file.as_str(), false, "\n").unwrap()
        );
        assert_eq!(
            Outcome::Quit,
            restore_one(&dataset, file.as_str(), false, "").unwrap()
        );
        assert_eq!("x".repeat(100), fs::read_to_string(&file).unwrap());
    }

    #[test]
    fn test_interactive_bad_choice() {
        let dataset = report_dataset();
        let file = dataset.root.join("report.txt");

        let err = restore_one(&dataset, file.as_str(), false, "7\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RestoreError>(),
            Some(RestoreError::InvalidSelection(_))
        ));
        assert_eq!("x".repeat(100), fs::read_to_string(&file).unwrap());
    }

    #[test]
    fn test_deleted_file() {
        let dataset = report_dataset();
        let file = dataset.root.join("report.txt");
        fs::remove_file(&file).unwrap();

        restore_one(&dataset, file.as_str(), true, "").unwrap();
        assert_eq!("y".repeat(120), fs::read_to_string(&file).unwrap());
    }

    #[test]
    fn test_no_candidates() {
        let dataset = report_dataset();
        let file = dataset.root.join("never_existed");

        let err = restore_one(&dataset, file.as_str(), true, "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RestoreError>(),
            Some(RestoreError::NoCandidates { examined: 2 })
        ));
    }

    #[test]
    fn test_missing_parent() {
        let dataset = report_dataset();
        let file = dataset.root.join("no/such/dir/report.txt");

        let err = restore_one(&dataset, file.as_str(), true, "").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RestoreError>(),
            Some(RestoreError::ParentNotFound { .. })
        ));
    }

    fn file_list(files: &[&Utf8PathBuf]) -> Vec<String> {
        files.iter().map(|f| f.to_string()).collect()
    }

    fn run_all(dataset: &Dataset, files: &[String], auto: bool, answers: &str) -> i32 {
        run(
            files,
            &ZrOpts { auto, noop: false },
            &dataset.mounts,
            &mut Cursor::new(answers.to_string()),
            &mut sink(),
            &Plain,
        )
    }

    #[test]
    fn test_run_counts_failures() {
        let dataset = report_dataset();
        let good = dataset.root.join("report.txt");
        let missing = dataset.root.join("no/such/dir/file");
        let unknown = dataset.root.join("never_existed");

        let files = file_list(&[&missing, &good, &unknown]);

        assert_eq!(2, run_all(&dataset, &files, true, ""));
        assert_eq!("y".repeat(120), fs::read_to_string(&good).unwrap());
    }

    #[test]
    fn test_run_quits_cleanly() {
        let dataset = report_dataset();
        let good = dataset.root.join("report.txt");
        let missing = dataset.root.join("no/such/dir/file");

        let files = file_list(&[&missing, &good, &good]);

        assert_eq!(0, run_all(&dataset, &files, false, ""));
        assert_eq!("x".repeat(100), fs::read_to_string(&good).unwrap());
    }

    #[test]
    fn test_run_carries_on_after_bad_choice() {
        let dataset = report_dataset();
        let good = dataset.root.join("report.txt");

        let files = file_list(&[&good, &good]);

        assert_eq!(1, run_all(&dataset, &files, false, "9\n0\n"));
        assert_eq!("y".repeat(120), fs::read_to_string(&good).unwrap());
    }

    #[test]
    fn test_run_all_good() {
        let dataset = report_dataset();
        let good = dataset.root.join("report.txt");

        assert_eq!(0, run_all(&dataset, &file_list(&[&good]), true, ""));
    }

    #[test]
    fn test_error_names_canonical_path() {
        let dataset = report_dataset();
        let file = dataset.root.join("dir/../never_existed");
        fs::create_dir(dataset.root.join("dir")).unwrap();

        let err = restore_one(&dataset, file.as_str(), true, "").unwrap_err();
        let message = format!("{:#}", err);

        assert!(message.starts_with(&format!(
            "cannot restore {}:",
            dataset.root.join("never_existed")
        )));
        assert!(matches!(
            err.downcast_ref::<RestoreError>(),
            Some(RestoreError::NoCandidates { .. })
        ));
    }
}
