//! Directory walking
//!
//! - `config` - what to select and report
//! - `fs` - the filesystem the walker reads through
//! - `engine` - the iterative traversal and its output hooks

mod config;
mod engine;
mod fs;

pub use config::{OutputMode, WalkerConfig};
pub use engine::{WalkEntry, WalkOutput, WalkSummary, Walker};
pub use fs::{DirEntry, EntryKind, FileSystem, OsFs};
