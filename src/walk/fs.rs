//! Filesystem access used by the walker
//!
//! The walker only needs to list directories, stat roots and read rule
//! files. `OsFs` does this over `std::fs`; tests substitute their own.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Kind of a filesystem entry. Symlinks are never followed during a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
}

/// One entry of a directory listing.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Lossy UTF-8 name, for rule-file and hidden checks only.
    pub name: String,
    /// Full path with the name's original bytes.
    pub path: PathBuf,
    pub kind: EntryKind,
    pub hidden: bool,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }

    /// The name exactly as stored on disk.
    pub fn file_name(&self) -> &OsStr {
        self.path.file_name().unwrap_or(self.name.as_ref())
    }
}

/// Minimal read-only filesystem abstraction for the walker.
pub trait FileSystem {
    /// Stat a root path, following symlinks.
    fn entry(&self, path: &Path) -> io::Result<DirEntry>;

    /// List a directory, sorted by name. Each entry's `path` is `dir`
    /// joined with its on-disk name.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;

    /// Read a rule file. `Ok(None)` if it is missing or not a regular file.
    fn read_rule_file(&self, path: &Path) -> io::Result<Option<String>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFs;

impl FileSystem for OsFs {
    fn entry(&self, path: &Path) -> io::Result<DirEntry> {
        let metadata = fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| ".".to_string());
        let kind = if metadata.is_dir() {
            EntryKind::Dir
        } else {
            EntryKind::File
        };
        Ok(DirEntry {
            hidden: is_hidden(&name, &metadata),
            name,
            path: path.to_path_buf(),
            kind,
        })
    }

    fn read_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let name = entry.file_name().to_string_lossy().to_string();
            let kind = if file_type.is_symlink() {
                EntryKind::Symlink
            } else if file_type.is_dir() {
                EntryKind::Dir
            } else {
                EntryKind::File
            };
            let hidden = match entry.metadata() {
                Ok(metadata) => is_hidden(&name, &metadata),
                Err(_) => name.starts_with('.'),
            };
            entries.push(DirEntry {
                name,
                path: entry.path(),
                kind,
                hidden,
            });
        }
        entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));
        Ok(entries)
    }

    fn read_rule_file(&self, path: &Path) -> io::Result<Option<String>> {
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        }
        let bytes = fs::read(path)?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }
}

#[cfg(windows)]
fn is_hidden(name: &str, metadata: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    name.starts_with('.') || metadata.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0
}

#[cfg(not(windows))]
fn is_hidden(name: &str, _metadata: &fs::Metadata) -> bool {
    name.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_dir_sorted_with_kinds() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.txt"), "").unwrap();
        fs::write(dir.path().join(".a"), "").unwrap();
        fs::create_dir(dir.path().join("c")).unwrap();

        let entries = OsFs.read_dir(dir.path()).unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, [".a", "b.txt", "c"]);
        assert!(entries[0].hidden);
        assert!(!entries[1].hidden);
        assert!(entries[2].is_dir());
    }

    #[test]
    #[cfg(unix)]
    fn test_symlinks_are_not_followed() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("real")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

        let entries = OsFs.read_dir(dir.path()).unwrap();
        let link = entries.iter().find(|e| e.name == "link").unwrap();
        assert_eq!(link.kind, EntryKind::Symlink);
    }

    #[test]
    #[cfg(unix)]
    fn test_non_utf8_name_is_preserved() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        let raw = OsStr::from_bytes(b"g\xfe.txt");
        fs::write(dir.path().join(raw), "").unwrap();

        let entries = OsFs.read_dir(dir.path()).unwrap();
        assert_eq!(entries[0].file_name(), raw);
        assert_eq!(entries[0].path, dir.path().join(raw));
        assert_eq!(entries[0].name, "g\u{fffd}.txt");
    }

    #[test]
    fn test_read_rule_file_missing_or_directory() {
        let dir = TempDir::new().unwrap();
        assert!(OsFs.read_rule_file(&dir.path().join("none")).unwrap().is_none());

        fs::create_dir(dir.path().join(".rules")).unwrap();
        assert!(OsFs.read_rule_file(&dir.path().join(".rules")).unwrap().is_none());

        fs::write(dir.path().join("rules"), "*.log\n").unwrap();
        assert_eq!(
            OsFs.read_rule_file(&dir.path().join("rules")).unwrap().as_deref(),
            Some("*.log\n")
        );
    }

    #[test]
    fn test_entry_for_missing_root() {
        let dir = TempDir::new().unwrap();
        let err = OsFs.entry(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
