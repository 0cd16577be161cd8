//! Plain path-per-line output
//!
//! Entries are written as soon as the walker produces them, so a consumer
//! can stop reading early in file mode.

use std::io::{self, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::error::WalkError;
use crate::walk::{EntryKind, WalkEntry, WalkOutput, WalkSummary};

use super::config::OutputConfig;

/// Streams one path per entry. Directories are drawn blue and bold when the
/// writer supports color.
pub struct PlainFormatter<W> {
    config: OutputConfig,
    out: W,
}

impl PlainFormatter<StandardStream> {
    /// Formatter writing to stdout.
    pub fn stdout(config: OutputConfig) -> Self {
        // Color was already decided from the environment and TTY.
        let choice = if config.use_color {
            ColorChoice::Always
        } else {
            ColorChoice::Never
        };
        Self::new(config, StandardStream::stdout(choice))
    }
}

impl<W: WriteColor> PlainFormatter<W> {
    pub fn new(config: OutputConfig, out: W) -> Self {
        Self { config, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Paths go out byte for byte so names that are not UTF-8 stay usable.
    fn write_path(&mut self, entry: &WalkEntry) -> io::Result<()> {
        self.out.write_all(entry.path.as_os_str().as_encoded_bytes())
    }
}

impl<W: WriteColor> WalkOutput for PlainFormatter<W> {
    fn emit(&mut self, entry: &WalkEntry) -> io::Result<()> {
        if entry.kind == EntryKind::Dir {
            self.out
                .set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_bold(true))?;
            self.write_path(entry)?;
            self.out.reset()?;
        } else {
            self.write_path(entry)?;
        }
        write!(self.out, "{}", self.config.terminator())
    }

    fn report_error(&mut self, error: &WalkError) {
        eprintln!("sift: {}", error);
    }

    fn finish(&mut self, _summary: &WalkSummary) -> io::Result<()> {
        self.out.flush()
    }
}
