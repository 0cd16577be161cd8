//! Output configuration types

/// Configuration for output formatting.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub use_color: bool,
    /// Terminate entries with NUL instead of newline.
    pub null_terminated: bool,
}

impl OutputConfig {
    pub fn terminator(&self) -> &'static str {
        if self.null_terminated { "\0" } else { "\n" }
    }
}
