//! Diagnostic output. Everything logged goes to stderr, bare, so verbose output reads like the
//! rest of the tool's messages.
//!
use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

pub fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    }
}

/// Sets up the global logger. RUST_LOG, if it is set, wins over the verbose flag. Calling this
/// more than once is harmless: later calls are ignored.
pub fn init(verbose: bool) {
    let _ = Builder::new()
        .filter_level(level_for(verbose))
        .parse_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .try_init();
}
