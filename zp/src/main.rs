use anyhow::{Context, anyhow};
use camino::Utf8Path;
use clap::{ArgAction, Parser};
use common::file_copier;
use common::logging;
use common::types::Opts;
use common::zfs_file;
use log::debug;
use std::fs;

#[derive(Parser)]
#[clap(version, about = "Promotes files from ZFS snapshots")]
struct Cli {
    /// Print what would happen, without doing it
    #[clap(short, long)]
    noop: bool,
    /// Be verbose
    #[clap(short, long)]
    verbose: bool,
    /// By default, existing live files are overwritten. With this option, they are not
    #[clap(short = 'N', long, action=ArgAction::SetTrue)]
    noclobber: bool,
    /// File(s) to promote
    #[clap(required = true, num_args = 1..)]
    file_list: Vec<String>,
}

/// Copies a file or directory out of a snapshot, back to where it lives on the live
/// filesystem. Returns the number of bytes copied.
fn promote(file: &Utf8Path, opts: &Opts) -> anyhow::Result<u64> {
    let file_path = file
        .canonicalize_utf8()
        .with_context(|| format!("failed to canonicalize {}", file))?;

    let target_file = zfs_file::live_path(&file_path)
        .ok_or_else(|| anyhow!("{} is not inside a ZFS snapshot", file_path))?;

    let target_dir = target_file
        .parent()
        .ok_or_else(|| anyhow!("could not find target directory for {}", target_file))?;

    if let Some(snapname) = zfs_file::snapshot_name(&file_path) {
        debug!("promoting {} from snapshot {}", target_file, snapname);
    }

    if !target_dir.exists() {
        if opts.noop {
            println!("mkdir {}", target_dir);
        } else {
            debug!("Creating {}", target_dir);
            fs::create_dir_all(target_dir)
                .with_context(|| format!("failed to create directory {}", target_dir))?;
        }
    }

    file_copier::copy_file(&file_path, &target_file, opts)
        .with_context(|| format!("failed to copy {} to {}", file_path, target_file))
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let opts = Opts {
        noop: cli.noop,
        noclobber: cli.noclobber,
    };

    let mut errs: i32 = 0;

    for file in &cli.file_list {
        match promote(Utf8Path::new(file), &opts) {
            Ok(bytes) => debug!("{}: copied {} bytes", file, bytes),
            Err(e) => {
                eprintln!("ERROR promoting {}: {:#}", file, e);
                errs += 1;
            }
        }
    }

    if errs > 0 {
        eprintln!("Encountered {} error(s)", errs);
        std::process::exit(errs.min(255));
    }
}
