//! Resolve path arguments into walk roots

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::WalkError;

/// True if `arg` contains wildcard syntax.
fn is_wildcard(arg: &str) -> bool {
    arg.contains(['*', '?', '['])
}

/// Turn each argument into one or more roots, in argument order.
///
/// Wildcard arguments expand to their matches in sorted order unless
/// `literal` is set. An empty argument list resolves to the current
/// directory. Failures are returned in place so the caller can report them
/// and still walk the other roots.
pub fn resolve_roots<S: AsRef<str>>(args: &[S], literal: bool) -> Vec<Result<PathBuf, WalkError>> {
    if args.is_empty() {
        return vec![Ok(PathBuf::from("."))];
    }

    let mut roots = Vec::new();
    for arg in args {
        let arg = arg.as_ref();
        if !literal && is_wildcard(arg) {
            expand(arg, &mut roots);
        } else {
            roots.push(existing(Path::new(arg)));
        }
    }
    roots
}

fn existing(path: &Path) -> Result<PathBuf, WalkError> {
    // symlink_metadata so a dangling link still counts as present
    if path.symlink_metadata().is_ok() {
        Ok(path.to_path_buf())
    } else {
        Err(WalkError::RootNotFound {
            path: path.to_path_buf(),
        })
    }
}

fn expand(pattern: &str, roots: &mut Vec<Result<PathBuf, WalkError>>) {
    let paths = match glob::glob(pattern) {
        Ok(paths) => paths,
        Err(source) => {
            roots.push(Err(WalkError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            }));
            return;
        }
    };

    let before = roots.len();
    for entry in paths {
        match entry {
            Ok(path) => roots.push(Ok(path)),
            Err(e) => warn!(pattern, error = %e, "skipping unreadable wildcard match"),
        }
    }
    let matched = roots.len() - before;
    debug!(pattern, matched, "expanded wildcard");

    if matched == 0 {
        roots.push(Err(WalkError::NoMatches {
            pattern: pattern.to_string(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTree;

    fn arg(tree: &TestTree, rel: &str) -> String {
        tree.path().join(rel).to_string_lossy().to_string()
    }

    #[test]
    fn test_no_arguments_means_current_directory() {
        let roots = resolve_roots::<&str>(&[], false);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].as_ref().unwrap(), Path::new("."));
    }

    #[test]
    fn test_existing_paths_pass_through() {
        let tree = TestTree::new();
        tree.add_file("a.txt", "");
        tree.add_dir("sub");

        let roots = resolve_roots(&[arg(&tree, "a.txt"), arg(&tree, "sub")], false);
        let roots: Vec<_> = roots.into_iter().map(Result::unwrap).collect();
        assert_eq!(roots, [tree.path().join("a.txt"), tree.path().join("sub")]);
    }

    #[test]
    fn test_missing_path_is_reported_in_place() {
        let tree = TestTree::new();
        tree.add_file("a.txt", "");

        let roots = resolve_roots(&[arg(&tree, "missing"), arg(&tree, "a.txt")], false);
        assert!(matches!(roots[0], Err(WalkError::RootNotFound { .. })));
        assert!(roots[1].is_ok());
    }

    #[test]
    fn test_wildcard_expands_sorted() {
        let tree = TestTree::new();
        tree.add_file("b.rs", "");
        tree.add_file("a.rs", "");
        tree.add_file("c.txt", "");

        let roots = resolve_roots(&[arg(&tree, "*.rs")], false);
        let roots: Vec<_> = roots.into_iter().map(Result::unwrap).collect();
        assert_eq!(roots, [tree.path().join("a.rs"), tree.path().join("b.rs")]);
    }

    #[test]
    fn test_wildcard_without_matches() {
        let tree = TestTree::new();
        let roots = resolve_roots(&[arg(&tree, "*.none")], false);
        assert!(matches!(roots[0], Err(WalkError::NoMatches { .. })));
    }

    #[test]
    fn test_malformed_wildcard() {
        let roots = resolve_roots(&["a/***"], false);
        assert!(matches!(roots[0], Err(WalkError::InvalidPattern { .. })));
        assert!(roots[0].as_ref().unwrap_err().is_input_error());
    }

    #[test]
    fn test_literal_paths_skip_expansion() {
        let tree = TestTree::new();
        tree.add_file("[x].txt", "");
        tree.add_file("x.txt", "");

        let roots = resolve_roots(&[arg(&tree, "[x].txt")], true);
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].as_ref().unwrap(), &tree.path().join("[x].txt"));

        let missing = resolve_roots(&[arg(&tree, "*.txt")], true);
        assert!(matches!(missing[0], Err(WalkError::RootNotFound { .. })));
    }
}
