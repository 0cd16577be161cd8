//! Layered rule scopes, newest first

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use tracing::debug;

use super::pattern::IgnoreRule;

/// Compiled rules ordered newest-first, with a count of how many each
/// directory pushed so its scope can be popped on exit.
///
/// The sum of all per-directory counts always equals the number of rules.
#[derive(Debug, Default)]
pub struct RuleScopeStack {
    rules: VecDeque<IgnoreRule>,
    pushed: HashMap<PathBuf, usize>,
}

impl RuleScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `lines` against `base` and push every valid rule to the front,
    /// charging them to `scope`. Returns how many rules were pushed.
    ///
    /// Later lines end up ahead of earlier ones, so they win.
    pub fn push_patterns<I, S>(&mut self, scope: &Path, base: &str, lines: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut count = 0;
        for line in lines {
            if let Some(rule) = IgnoreRule::parse(line.as_ref(), base) {
                self.rules.push_front(rule);
                count += 1;
            }
        }
        *self.pushed.entry(scope.to_path_buf()).or_insert(0) += count;
        if count > 0 {
            debug!(scope = %scope.display(), count, total = self.len(), "pushed rules");
        }
        count
    }

    /// Pop every rule `scope` pushed. Returns how many were removed.
    pub fn pop_scope(&mut self, scope: &Path) -> usize {
        let count = self.pushed.remove(scope).unwrap_or(0);
        for _ in 0..count {
            self.rules.pop_front();
        }
        if count > 0 {
            debug!(scope = %scope.display(), count, "popped rules");
        }
        count
    }

    /// Rules in priority order paired with their rank.
    ///
    /// A rule's rank is its distance from the bottom of the stack, so it
    /// stays fixed while the scope that pushed it is live.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &IgnoreRule)> {
        let len = self.rules.len();
        self.rules
            .iter()
            .enumerate()
            .map(move |(i, rule)| (len - 1 - i, rule))
    }

    /// True if a negated rule outranks `rank`.
    pub fn has_negation_above(&self, rank: usize) -> bool {
        self.ranked()
            .take_while(|&(r, _)| r > rank)
            .any(|(_, rule)| rule.is_negated())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_skips_comments_and_counts_rules() {
        let mut stack = RuleScopeStack::new();
        let pushed = stack.push_patterns(Path::new("/r"), "/r", ["# header", "*.log", "", "tmp/"]);
        assert_eq!(pushed, 2);
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_later_lines_take_priority() {
        let mut stack = RuleScopeStack::new();
        stack.push_patterns(Path::new("/r"), "/r", ["first", "second"]);
        let sources: Vec<_> = stack.ranked().map(|(_, rule)| rule.source()).collect();
        assert_eq!(sources, ["second", "first"]);
    }

    #[test]
    fn test_pushes_to_same_scope_accumulate() {
        let mut stack = RuleScopeStack::new();
        stack.push_patterns(Path::new("/r"), "/r", ["seed"]);
        stack.push_patterns(Path::new("/r"), "/r", ["a", "b"]);
        assert_eq!(stack.pop_scope(Path::new("/r")), 3);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_pop_removes_only_nested_scope() {
        let mut stack = RuleScopeStack::new();
        stack.push_patterns(Path::new("/r"), "/r", ["outer"]);
        stack.push_patterns(Path::new("/r/a"), "/r/a", ["inner1", "inner2"]);
        assert_eq!(stack.len(), 3);

        assert_eq!(stack.pop_scope(Path::new("/r/a")), 2);
        let sources: Vec<_> = stack.ranked().map(|(_, rule)| rule.source()).collect();
        assert_eq!(sources, ["outer"]);

        assert_eq!(stack.pop_scope(Path::new("/r/unknown")), 0);
        assert_eq!(stack.len(), 1);
    }

    #[test]
    fn test_ranks_survive_nested_pushes() {
        let mut stack = RuleScopeStack::new();
        stack.push_patterns(Path::new("/r"), "/r", ["a/", "!a/x"]);
        let ranks: Vec<_> = stack.ranked().map(|(r, rule)| (r, rule.source())).collect();
        assert_eq!(ranks, [(1, "!a/x"), (0, "a/")]);

        stack.push_patterns(Path::new("/r/a"), "/r/a", ["y"]);
        let outer = stack.ranked().find(|(_, rule)| rule.source() == "a/");
        assert_eq!(outer.map(|(r, _)| r), Some(0));
    }

    #[test]
    fn test_negation_above_rank() {
        let mut stack = RuleScopeStack::new();
        stack.push_patterns(Path::new("/r"), "/r", ["!keep", "drop/"]);
        assert!(!stack.has_negation_above(1));
        assert!(!stack.has_negation_above(0));

        stack.push_patterns(Path::new("/r/sub"), "/r/sub", ["!again"]);
        assert!(stack.has_negation_above(1));
    }
}
