//! Walk output formatting
//!
//! - `config` - output configuration types
//! - `plain` - one path per line, streamed, optionally colored
//! - `json` - a single JSON document written when the walk finishes

mod config;
mod json;
mod plain;

pub use config::OutputConfig;
pub use json::JsonFormatter;
pub use plain::PlainFormatter;
