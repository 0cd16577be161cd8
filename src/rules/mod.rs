//! Rule compilation, scoping and matching
//!
//! - `pattern` - compiles one rule line into an anchored matcher
//! - `stack` - per-directory rule scopes, newest first
//! - `evaluate` - decides keep/drop for one candidate

mod evaluate;
mod pattern;
mod stack;

use std::path::Path;

pub use evaluate::{Verdict, decide, evaluate};
pub use pattern::IgnoreRule;
pub use stack::RuleScopeStack;

/// Render a path the way rules match it: forward slashes, and a trailing
/// `/` for directories.
pub fn candidate_path(path: &Path, is_dir: bool) -> String {
    let mut s = normalize_separators(&path.to_string_lossy());
    if is_dir && !s.ends_with('/') {
        s.push('/');
    }
    s
}

/// Forward-slash form of a directory path, used as a rule anchor.
pub fn anchor_path(dir: &Path) -> String {
    normalize_separators(&dir.to_string_lossy())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(windows)]
fn normalize_separators(s: &str) -> String {
    s.replace('\\', "/")
}

#[cfg(not(windows))]
fn normalize_separators(s: &str) -> String {
    s.to_string()
}
