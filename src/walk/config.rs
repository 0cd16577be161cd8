//! Configuration types for the walker

/// What a walk reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputMode {
    /// Surviving files, streamed as they are found.
    #[default]
    Files,
    /// Directories that contain at least one surviving file.
    Directories,
}

/// Configuration for walking behavior.
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Name of the per-directory rule file to read, if any.
    pub ignore_file_name: Option<String>,
    /// Extra rules applied as if declared first in each root's rule file.
    pub ignore_patterns: Vec<String>,
    /// Report rule files themselves (they are always read).
    pub include_ignore_files: bool,
    pub mode: OutputMode,
    /// Maximum directory depth to expand; `None` is unbounded.
    pub max_depth: Option<usize>,
    /// Select hidden items instead of non-hidden ones.
    pub hidden: bool,
    /// Select hidden and non-hidden items alike.
    pub force: bool,
    /// Report the ignored set instead of survivors.
    pub ignored: bool,
}

impl WalkerConfig {
    /// True if `name` is the configured rule file name.
    pub fn is_rule_file(&self, name: &str) -> bool {
        self.ignore_file_name.as_deref() == Some(name)
    }

    /// True if a rule file named `name` should be left out of the output.
    pub fn skips_rule_file(&self, name: &str) -> bool {
        !self.include_ignore_files && self.is_rule_file(name)
    }

    /// Hidden-attribute selection.
    ///
    /// Files must match the requested visibility. Directories are only
    /// pruned when hidden and hidden items are not requested at all, since a
    /// visible directory may hold hidden files.
    pub fn selects_visibility(&self, is_dir: bool, is_hidden: bool) -> bool {
        if self.force {
            return true;
        }
        if is_dir {
            !is_hidden || self.hidden
        } else {
            is_hidden == self.hidden
        }
    }

    /// True if a directory at `depth` (root is 0) may be expanded.
    pub fn allows_depth(&self, depth: usize) -> bool {
        self.max_depth.is_none_or(|max| depth <= max)
    }
}
