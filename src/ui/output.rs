//! Output verbosity.

/// How much the CLI prints besides its results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Also show per-manager progress and why managers were not found.
    Verbose,
    #[default]
    Normal,
    /// Results only; no spinners or headers.
    Quiet,
    /// Nothing except errors.
    Silent,
}

impl OutputMode {
    /// Mode for the global `--verbose`/`--quiet` flags.
    ///
    /// Machine-readable output forces `Quiet` so stdout stays parseable, and
    /// `quiet` wins over `verbose`.
    pub fn from_flags(verbose: bool, quiet: bool, machine_readable: bool) -> Self {
        if machine_readable || quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    pub fn shows_details(&self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Spinners and section headers.
    pub fn shows_spinners(&self) -> bool {
        matches!(self, Self::Verbose | Self::Normal)
    }

    /// Plain messages, successes, warnings and hints.
    pub fn shows_status(&self) -> bool {
        self != &Self::Silent
    }
}
