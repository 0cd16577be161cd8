//! Sift - list files through layered .gitignore-style rule files, no VCS required

pub mod error;
pub mod output;
pub mod roots;
pub mod rules;
pub mod walk;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{Result, WalkError};
pub use output::{JsonFormatter, OutputConfig, PlainFormatter};
pub use roots::resolve_roots;
pub use rules::{IgnoreRule, RuleScopeStack, Verdict, decide, evaluate};
pub use walk::{OutputMode, WalkEntry, WalkOutput, WalkSummary, Walker, WalkerConfig};
