//! Compiles one rule line into an anchored path matcher
//!
//! Rules follow the `.gitignore` line format with a few deliberate quirks:
//! unanchored patterns match at any depth below the declaring directory,
//! and `?` may match a `/`.

use regex::Regex;
use tracing::trace;

/// A compiled ignore rule, anchored to the directory that declared it.
#[derive(Debug, Clone)]
pub struct IgnoreRule {
    directory_only: bool,
    negated: bool,
    matcher: Regex,
    source: String,
}

impl IgnoreRule {
    /// Compile a rule line declared in the directory `base`.
    ///
    /// `base` is the absolute, forward-slash path of the declaring directory.
    /// Returns `None` for blank and comment lines. Malformed glob syntax is
    /// matched as literal text instead of failing.
    pub fn parse(line: &str, base: &str) -> Option<Self> {
        let line = line.trim_start();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }

        let (negated, rest) = match line.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, line),
        };

        let pattern = unescape_edges(trim_unescaped_trailing_whitespace(rest));
        if pattern.is_empty() {
            return None;
        }

        let pattern = if pattern.starts_with('/') {
            pattern
        } else {
            format!("/**/{}", pattern)
        };
        let directory_only = pattern.ends_with('/');
        let pattern = if directory_only {
            pattern
        } else {
            format!("{}/**", pattern)
        };

        // `?` and `/**` must also match newlines in names.
        let anchor = regex::escape(base.trim_end_matches('/'));
        let compile =
            |classes| Regex::new(&format!("(?s)^{}{}$", anchor, translate(&pattern, classes)));
        let matcher = compile(true).or_else(|_| compile(false)).ok()?;
        trace!(rule = line, regex = matcher.as_str(), "compiled rule");

        Some(Self {
            directory_only,
            negated,
            matcher,
            source: line.to_string(),
        })
    }

    /// True if the rule only applies to directories (line ended in `/`).
    pub fn is_directory_only(&self) -> bool {
        self.directory_only
    }

    /// True if the rule re-includes what it matches (line began with `!`).
    pub fn is_negated(&self) -> bool {
        self.negated
    }

    /// Match a normalized absolute candidate path.
    ///
    /// Directory candidates carry a trailing `/`.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.matcher.is_match(candidate)
    }

    /// The rule line as written, after leading whitespace is trimmed.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Drop trailing whitespace that is not escaped by a backslash.
fn trim_unescaped_trailing_whitespace(s: &str) -> &str {
    let mut end = s.len();
    while let Some(c) = s[..end].chars().next_back() {
        if !c.is_whitespace() {
            break;
        }
        let before = &s[..end - c.len_utf8()];
        if before.ends_with('\\') {
            break;
        }
        end = before.len();
    }
    &s[..end]
}

/// Remove a backslash at the very start, or one escaping whitespace.
fn unescape_edges(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len());
    for (i, &c) in chars.iter().enumerate() {
        let escapes_space = chars.get(i + 1).is_some_and(|n| n.is_whitespace());
        if c == '\\' && (i == 0 || escapes_space) {
            continue;
        }
        out.push(c);
    }
    out
}

/// Translate glob syntax into a regex body.
///
/// With `classes` false, bracket expressions are kept as literal text.
fn translate(pattern: &str, classes: bool) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        let escaped = i > 0 && chars[i - 1] == '\\';
        match chars[i] {
            '/' if chars.get(i + 1) == Some(&'*') && chars.get(i + 2) == Some(&'*') => {
                out.push_str("(/.*)?");
                i += 3;
            }
            '/' => {
                out.push('/');
                i += 1;
            }
            '*' if !escaped => {
                out.push_str("[^/]*");
                i += 1;
            }
            '?' if !escaped => {
                out.push('.');
                i += 1;
            }
            '[' if !escaped && classes => match class_end(&chars, i) {
                Some(end) => {
                    out.push_str(&char_class(&chars[i + 1..end]));
                    i = end + 1;
                }
                None => {
                    out.push_str(r"\[");
                    i += 1;
                }
            },
            '[' if !escaped => {
                out.push_str(r"\[");
                i += 1;
            }
            _ => {
                let start = i;
                i += 1;
                while i < chars.len() && !is_special(&chars, i) {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                out.push_str(&regex::escape(&unescape_text(&text)));
            }
        }
    }

    out
}

/// True if the char at `i` starts a glob token rather than continuing text.
fn is_special(chars: &[char], i: usize) -> bool {
    match chars[i] {
        '/' => true,
        '*' | '?' | '[' => chars[i - 1] != '\\',
        _ => false,
    }
}

/// Index of the `]` closing the bracket at `open`, if the set is non-empty
/// and contains no `/`.
fn class_end(chars: &[char], open: usize) -> Option<usize> {
    let mut j = open + 2;
    if chars.get(open + 1).is_none_or(|&c| c == '/') {
        return None;
    }
    while let Some(&c) = chars.get(j) {
        match c {
            ']' => return Some(j),
            '/' => return None,
            _ => j += 1,
        }
    }
    None
}

fn char_class(set: &[char]) -> String {
    let (negated, members) = match set.split_first() {
        Some(('!', rest)) if !rest.is_empty() => (true, rest),
        _ => (false, set),
    };
    let mut out = String::from(if negated { "[^" } else { "[" });
    for &c in members {
        if matches!(c, '\\' | '[' | ']' | '^' | '&' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(']');
    out
}

/// Undo `\[`, `\\`, `\*` and `\?` inside literal text.
fn unescape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if matches!(next, '[' | '\\' | '*' | '?') {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
