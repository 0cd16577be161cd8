//! Test utilities for building temporary directory trees.
//!
//! This module is only compiled for tests, benchmarks and the `test-utils`
//! feature.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::error::WalkError;
use crate::walk::{WalkEntry, WalkOutput};

/// A temporary directory tree for testing.
///
/// The tree is removed when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Create an empty directory, with parents.
    pub fn add_dir(&self, path: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        fs::create_dir_all(&full_path).expect("Failed to create dir");
        full_path
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// A `WalkOutput` that records everything it is given.
#[derive(Debug, Default)]
pub struct CollectOutput {
    pub entries: Vec<WalkEntry>,
    pub errors: Vec<String>,
}

impl CollectOutput {
    /// Emitted paths relative to `root`, with `/` separators, in emission
    /// order. The root itself is `""`.
    pub fn relative_paths(&self, root: &Path) -> Vec<String> {
        self.entries
            .iter()
            .map(|e| {
                let rel = e.path.strip_prefix(root).unwrap_or(&e.path);
                rel.components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect::<Vec<_>>()
                    .join("/")
            })
            .collect()
    }
}

impl WalkOutput for CollectOutput {
    fn emit(&mut self, entry: &WalkEntry) -> std::io::Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn report_error(&mut self, error: &WalkError) {
        self.errors.push(error.to_string());
    }
}
