/// Options which change how files are put back on the live filesystem.
#[derive(Clone, Copy, Debug, Default)]
pub struct Opts {
    pub noop: bool,
    pub noclobber: bool,
}
