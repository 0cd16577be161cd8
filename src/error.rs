//! Error types for walking and root resolution

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while resolving roots or walking a tree.
///
/// Input errors (`RootNotFound`, `NoMatches`, `InvalidPattern`) are reported
/// per root. `ReadDir` and `ReadRuleFile` cost the affected subtree only;
/// `Output` aborts the walk in progress.
#[derive(Debug, Error)]
pub enum WalkError {
    #[error("cannot access '{}': No such file or directory", path.display())]
    RootNotFound { path: PathBuf },

    #[error("no paths match '{pattern}'")]
    NoMatches { pattern: String },

    #[error("invalid path pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("cannot read directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read rule file '{}': {source}", path.display())]
    ReadRuleFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("error writing output: {0}")]
    Output(#[from] io::Error),
}

impl WalkError {
    /// True for errors caused by the arguments rather than the filesystem.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::RootNotFound { .. } | Self::NoMatches { .. } | Self::InvalidPattern { .. }
        )
    }

    /// The path the error is about, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::RootNotFound { path }
            | Self::ReadDir { path, .. }
            | Self::ReadRuleFile { path, .. } => Some(path),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, WalkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_classified() {
        let missing = WalkError::RootNotFound {
            path: PathBuf::from("nope"),
        };
        assert!(missing.is_input_error());
        assert_eq!(
            missing.to_string(),
            "cannot access 'nope': No such file or directory"
        );

        let io = WalkError::ReadDir {
            path: PathBuf::from("locked"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert!(!io.is_input_error());
        assert_eq!(io.path(), Some(std::path::Path::new("locked")));
    }
}
