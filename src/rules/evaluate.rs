//! Keep/drop decisions against the live rule stack

use tracing::trace;

use super::stack::RuleScopeStack;

/// Outcome of matching one candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Keep,
    Drop,
}

impl Verdict {
    pub fn is_keep(self) -> bool {
        self == Verdict::Keep
    }

    /// The opposite verdict, used when reporting the ignored set.
    pub fn inverted(self) -> Self {
        match self {
            Verdict::Keep => Verdict::Drop,
            Verdict::Drop => Verdict::Keep,
        }
    }
}

/// Judge a normalized candidate path with `.gitignore` semantics.
///
/// The highest-priority matching rule decides: negated rules keep, others
/// drop. Directory-only rules are skipped for files. Unmatched paths are kept.
pub fn evaluate(rules: &RuleScopeStack, candidate: &str, is_dir: bool) -> Verdict {
    decide(rules, candidate, is_dir, None).map_or(Verdict::Keep, |(verdict, _)| verdict)
}

/// Find the deciding rule among those ranked above `floor`.
///
/// Returns the verdict and the rank of the rule that produced it, or `None`
/// if no eligible rule matches.
pub fn decide(
    rules: &RuleScopeStack,
    candidate: &str,
    is_dir: bool,
    floor: Option<usize>,
) -> Option<(Verdict, usize)> {
    for (rank, rule) in rules.ranked() {
        if floor.is_some_and(|floor| rank <= floor) {
            break;
        }
        if rule.is_directory_only() && !is_dir {
            continue;
        }
        if rule.is_match(candidate) {
            let verdict = if rule.is_negated() {
                Verdict::Keep
            } else {
                Verdict::Drop
            };
            trace!(candidate, rule = rule.source(), ?verdict, "rule matched");
            return Some((verdict, rank));
        }
    }
    None
}
