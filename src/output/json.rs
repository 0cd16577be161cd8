//! JSON output formatting

use std::io::{self, Write};

use serde::Serialize;

use crate::error::WalkError;
use crate::walk::{WalkEntry, WalkOutput, WalkSummary};

#[derive(Debug, Serialize)]
struct JsonError {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonDocument<'a> {
    entries: &'a [WalkEntry],
    errors: &'a [JsonError],
    files: usize,
    directories: usize,
}

/// Buffers every entry and error, then writes one pretty-printed JSON
/// document on `finish`.
pub struct JsonFormatter<W> {
    out: W,
    entries: Vec<WalkEntry>,
    errors: Vec<JsonError>,
}

impl JsonFormatter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonFormatter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            entries: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> WalkOutput for JsonFormatter<W> {
    fn emit(&mut self, entry: &WalkEntry) -> io::Result<()> {
        self.entries.push(entry.clone());
        Ok(())
    }

    fn report_error(&mut self, error: &WalkError) {
        self.errors.push(JsonError {
            message: error.to_string(),
            path: error.path().map(|p| p.display().to_string()),
        });
    }

    fn finish(&mut self, summary: &WalkSummary) -> io::Result<()> {
        let document = JsonDocument {
            entries: &self.entries,
            errors: &self.errors,
            files: summary.files,
            directories: summary.directories,
        };
        let json = serde_json::to_string_pretty(&document).map_err(io::Error::other)?;
        writeln!(self.out, "{}", json)?;
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::walk::EntryKind;

    #[test]
    fn test_document_shape() {
        let mut formatter = JsonFormatter::new(Vec::new());
        formatter
            .emit(&WalkEntry {
                kind: EntryKind::File,
                path: PathBuf::from("src/lib.rs"),
            })
            .unwrap();
        formatter.report_error(&WalkError::ReadDir {
            path: PathBuf::from("locked"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        });
        formatter
            .finish(&WalkSummary {
                files: 1,
                directories: 0,
                errors: 1,
            })
            .unwrap();

        let json: serde_json::Value = serde_json::from_slice(&formatter.into_inner()).unwrap();
        assert_eq!(json["entries"][0]["type"], "file");
        assert_eq!(json["entries"][0]["path"], "src/lib.rs");
        assert_eq!(json["errors"][0]["path"], "locked");
        assert_eq!(json["files"], 1);
    }

    #[test]
    #[cfg(unix)]
    fn test_non_utf8_path_is_replaced_not_fatal() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let mut formatter = JsonFormatter::new(Vec::new());
        formatter
            .emit(&WalkEntry {
                kind: EntryKind::File,
                path: PathBuf::from(OsStr::from_bytes(b"g\xfe.txt")),
            })
            .unwrap();
        formatter.finish(&WalkSummary::default()).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&formatter.into_inner()).unwrap();
        assert_eq!(json["entries"][0]["path"], "g\u{fffd}.txt");
    }
}
