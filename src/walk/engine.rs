//! Iterative, rule-scoped directory traversal
//!
//! Each directory is visited twice through one deque. On entry its rule
//! file is pushed and its children are judged; surviving subdirectories are
//! queued ahead of it, so it only comes back to the front (its exit) once its
//! whole subtree is done. On exit exactly the rules it pushed are popped.

use std::collections::{HashSet, VecDeque};
use std::io;
use std::path::{Path, PathBuf};

use serde::{Serialize, Serializer};
use tracing::{debug, trace, warn};

use crate::error::{Result, WalkError};
use crate::rules::{RuleScopeStack, Verdict, anchor_path, candidate_path, decide, evaluate};

use super::config::{OutputMode, WalkerConfig};
use super::fs::{DirEntry, EntryKind, FileSystem, OsFs};

/// One reported path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WalkEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Path as reached from the root argument.
    #[serde(serialize_with = "serialize_lossy")]
    pub path: PathBuf,
}

/// JSON strings must be UTF-8, so undecodable bytes are replaced.
fn serialize_lossy<S: Serializer>(
    path: &Path,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&path.to_string_lossy())
}

/// Counts for one or more walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    pub files: usize,
    pub directories: usize,
    pub errors: usize,
}

impl WalkSummary {
    pub fn merge(&mut self, other: WalkSummary) {
        self.files += other.files;
        self.directories += other.directories;
        self.errors += other.errors;
    }
}

/// Receives walk results as they are produced.
pub trait WalkOutput {
    fn emit(&mut self, entry: &WalkEntry) -> io::Result<()>;

    /// Called for a subtree that could not be read. The walk continues.
    fn report_error(&mut self, error: &WalkError);

    fn finish(&mut self, _summary: &WalkSummary) -> io::Result<()> {
        Ok(())
    }
}

/// How the rules treat a directory and everything beneath it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Not excluded; unmatched children are kept.
    Included,
    /// Excluded by the rule at `rank`, but a higher-ranked negation may
    /// re-include something below. Unmatched children stay excluded.
    Excluded { rank: usize },
    /// Excluded with nothing able to re-include; only walked when reporting
    /// the ignored set.
    Pruned,
}

#[derive(Debug)]
struct DirRecord {
    path: PathBuf,
    absolute: PathBuf,
    depth: usize,
    scope: Scope,
}

/// Walks roots and reports what survives the rule stack.
pub struct Walker<F = OsFs> {
    config: WalkerConfig,
    fs: F,
}

impl Walker<OsFs> {
    pub fn new(config: WalkerConfig) -> Self {
        Self::with_fs(config, OsFs)
    }
}

impl<F: FileSystem> Walker<F> {
    pub fn with_fs(config: WalkerConfig, fs: F) -> Self {
        Self { config, fs }
    }

    /// Walk one root, streaming results into `output`.
    ///
    /// Unreadable subtrees are passed to `output.report_error` and counted;
    /// only a missing root or a failing sink stops the walk.
    pub fn walk<O: WalkOutput>(&self, root: &Path, output: &mut O) -> Result<WalkSummary> {
        let entry = self.fs.entry(root).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                WalkError::RootNotFound {
                    path: root.to_path_buf(),
                }
            } else {
                WalkError::ReadDir {
                    path: root.to_path_buf(),
                    source,
                }
            }
        })?;
        let absolute = std::path::absolute(root).map_err(|_| WalkError::RootNotFound {
            path: root.to_path_buf(),
        })?;
        debug!(root = %root.display(), "walking");

        let mut traversal = Traversal::new(&self.config, &self.fs, output);
        if entry.is_dir() {
            traversal.run(root, absolute)?;
        } else {
            traversal.run_file(root, &absolute, &entry)?;
        }
        Ok(traversal.summary)
    }
}

/// State owned by a single root's walk.
struct Traversal<'a, F, O> {
    config: &'a WalkerConfig,
    fs: &'a F,
    output: &'a mut O,
    rules: RuleScopeStack,
    queue: VecDeque<DirRecord>,
    visited: HashSet<PathBuf>,
    /// Directories known to hold a surviving file (directory mode only).
    live: HashSet<PathBuf>,
    /// Live directories in exit order; emitted last-in first-out.
    pending: Vec<WalkEntry>,
    summary: WalkSummary,
}

impl<'a, F: FileSystem, O: WalkOutput> Traversal<'a, F, O> {
    fn new(config: &'a WalkerConfig, fs: &'a F, output: &'a mut O) -> Self {
        Self {
            config,
            fs,
            output,
            rules: RuleScopeStack::new(),
            queue: VecDeque::new(),
            visited: HashSet::new(),
            live: HashSet::new(),
            pending: Vec::new(),
            summary: WalkSummary::default(),
        }
    }

    fn run(&mut self, root: &Path, absolute: PathBuf) -> Result<()> {
        let config = self.config;
        self.rules
            .push_patterns(&absolute, &anchor_path(&absolute), &config.ignore_patterns);
        self.queue.push_front(DirRecord {
            path: root.to_path_buf(),
            absolute,
            depth: 0,
            scope: Scope::Included,
        });

        while let Some(top) = self.queue.pop_front() {
            if self.visited.remove(&top.absolute) {
                self.exit(top);
                continue;
            }
            self.visited.insert(top.absolute.clone());
            let children = self.enter(&top)?;
            self.queue.push_front(top);
            for child in children.into_iter().rev() {
                self.queue.push_front(child);
            }
        }

        while let Some(dir) = self.pending.pop() {
            self.output.emit(&dir)?;
            self.summary.directories += 1;
        }
        Ok(())
    }

    /// A plain-file root is judged alone against the explicit patterns,
    /// scoped to its containing directory.
    fn run_file(&mut self, root: &Path, absolute: &Path, entry: &DirEntry) -> Result<()> {
        let config = self.config;
        let parent = absolute.parent().unwrap_or(absolute);
        self.rules
            .push_patterns(parent, &anchor_path(parent), &config.ignore_patterns);

        if config.skips_rule_file(&entry.name) || !config.selects_visibility(false, entry.hidden) {
            return Ok(());
        }
        let verdict = evaluate(&self.rules, &candidate_path(absolute, false), false);
        if !self.reports(verdict) {
            return Ok(());
        }

        match config.mode {
            OutputMode::Files => {
                self.output.emit(&WalkEntry {
                    kind: entry.kind,
                    path: root.to_path_buf(),
                })?;
                self.summary.files += 1;
            }
            OutputMode::Directories => {
                let dir = root
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."));
                self.output.emit(&WalkEntry {
                    kind: EntryKind::Dir,
                    path: dir.to_path_buf(),
                })?;
                self.summary.directories += 1;
            }
        }
        Ok(())
    }

    /// First visit: load the rule file, judge children, return the
    /// subdirectories to descend into.
    fn enter(&mut self, top: &DirRecord) -> Result<Vec<DirRecord>> {
        let config = self.config;
        trace!(dir = %top.path.display(), depth = top.depth, "entering directory");

        if let Some(name) = &config.ignore_file_name {
            let rule_file = top.absolute.join(name);
            match self.fs.read_rule_file(&rule_file) {
                Ok(Some(text)) => {
                    let count = self.rules.push_patterns(
                        &top.absolute,
                        &anchor_path(&top.absolute),
                        text.lines(),
                    );
                    debug!(file = %rule_file.display(), count, "loaded rule file");
                }
                Ok(None) => {}
                Err(source) => {
                    self.report(WalkError::ReadRuleFile {
                        path: top.path.join(name),
                        source,
                    });
                    return Ok(Vec::new());
                }
            }
        }

        let entries = match self.fs.read_dir(&top.absolute) {
            Ok(entries) => entries,
            Err(source) => {
                self.report(WalkError::ReadDir {
                    path: top.path.clone(),
                    source,
                });
                return Ok(Vec::new());
            }
        };

        let mut children = Vec::new();
        for entry in &entries {
            if let Some(child) = self.consider(top, entry)? {
                children.push(child);
            }
        }
        Ok(children)
    }

    /// Second visit: pop this directory's rules and settle its liveness.
    fn exit(&mut self, top: DirRecord) {
        let popped = self.rules.pop_scope(&top.absolute);
        trace!(dir = %top.path.display(), popped, "leaving directory");

        if self.live.remove(&top.absolute) {
            if top.depth > 0 {
                if let Some(parent) = top.absolute.parent() {
                    self.live.insert(parent.to_path_buf());
                }
            }
            self.pending.push(WalkEntry {
                kind: EntryKind::Dir,
                path: top.path,
            });
        }
    }

    /// Judge one child. Returns a record if it is a directory to descend into.
    fn consider(&mut self, parent: &DirRecord, entry: &DirEntry) -> Result<Option<DirRecord>> {
        let config = self.config;
        let is_dir = entry.is_dir();

        if !is_dir && config.skips_rule_file(&entry.name) {
            return Ok(None);
        }
        if !config.selects_visibility(is_dir, entry.hidden) {
            return Ok(None);
        }
        // A live directory stays live; its other files change nothing.
        if !is_dir && config.mode == OutputMode::Directories && self.live.contains(&parent.absolute)
        {
            return Ok(None);
        }

        let absolute = entry.path.clone();
        let (verdict, rank) = self.judge(parent.scope, &absolute, is_dir);
        let path = parent.path.join(entry.file_name());

        if !is_dir {
            if self.reports(verdict) {
                self.accept_file(parent, path, entry.kind)?;
            }
            return Ok(None);
        }

        let scope = match (verdict, rank) {
            (Verdict::Keep, _) => Scope::Included,
            (Verdict::Drop, Some(rank)) if self.rules.has_negation_above(rank) => {
                Scope::Excluded { rank }
            }
            (Verdict::Drop, _) => Scope::Pruned,
        };
        let depth = parent.depth + 1;
        let descend = scope != Scope::Pruned || config.ignored;
        if descend && config.allows_depth(depth) {
            Ok(Some(DirRecord {
                path,
                absolute,
                depth,
                scope,
            }))
        } else {
            Ok(None)
        }
    }

    /// Verdict a path would get in file mode, with the rank of the rule that
    /// decided it (or of the exclusion it inherits).
    fn judge(&self, scope: Scope, absolute: &Path, is_dir: bool) -> (Verdict, Option<usize>) {
        let candidate = candidate_path(absolute, is_dir);
        match scope {
            Scope::Pruned => (Verdict::Drop, None),
            Scope::Included => match decide(&self.rules, &candidate, is_dir, None) {
                Some((verdict, rank)) => (verdict, Some(rank)),
                None => (Verdict::Keep, None),
            },
            Scope::Excluded { rank: floor } => {
                match decide(&self.rules, &candidate, is_dir, Some(floor)) {
                    Some((verdict, rank)) => (verdict, Some(rank)),
                    None => (Verdict::Drop, Some(floor)),
                }
            }
        }
    }

    /// True if a file-mode verdict means the path belongs in this walk's
    /// output: survivors normally, the complement when reporting ignored.
    fn reports(&self, verdict: Verdict) -> bool {
        if self.config.ignored {
            verdict.inverted().is_keep()
        } else {
            verdict.is_keep()
        }
    }

    fn accept_file(&mut self, parent: &DirRecord, path: PathBuf, kind: EntryKind) -> Result<()> {
        match self.config.mode {
            OutputMode::Directories => {
                self.live.insert(parent.absolute.clone());
            }
            OutputMode::Files => {
                self.output.emit(&WalkEntry { kind, path })?;
                self.summary.files += 1;
            }
        }
        Ok(())
    }

    fn report(&mut self, error: WalkError) {
        warn!(error = %error, "skipping unreadable subtree");
        self.output.report_error(&error);
        self.summary.errors += 1;
    }
}
