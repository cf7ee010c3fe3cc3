use signal_hook::consts::SIGINT;
use signal_hook::low_level;
use std::io;

/// A ^C at any point abandons the whole run. That counts as success: the user meant it.
pub fn exit_on_interrupt() -> io::Result<()> {
    // SAFETY: the handler does nothing but _exit(), which is async-signal-safe.
    unsafe {
        low_level::register(SIGINT, || low_level::exit(0))?;
    }

    Ok(())
}
