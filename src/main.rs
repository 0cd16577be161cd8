//! CLI entry point for sift

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sift::{
    JsonFormatter, OutputConfig, OutputMode, PlainFormatter, WalkError, WalkOutput, WalkSummary,
    Walker, WalkerConfig, resolve_roots,
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(about = "List files through layered .gitignore-style rule files")]
#[command(version)]
struct Args {
    /// Paths to walk; wildcards are expanded (default: current directory)
    paths: Vec<String>,

    /// Take paths verbatim, without wildcard expansion
    #[arg(long = "literal-path")]
    literal_path: bool,

    /// Name of the per-directory rule file to read (e.g. .gitignore)
    #[arg(long = "ignore-file-name", visible_alias = "ifn", value_name = "NAME")]
    ignore_file_name: Option<String>,

    /// Extra rule applied at the top of each root (can be used multiple times)
    #[arg(short = 'I', long = "ignore-pattern", value_name = "PATTERN")]
    ignore_pattern: Vec<String>,

    /// List the rule files themselves too
    #[arg(long = "include-ignore-files", conflicts_with = "directory")]
    include_ignore_files: bool,

    /// List directories holding at least one listed file instead of files
    #[arg(short = 'd', long = "directory")]
    directory: bool,

    /// Expand directories at most N levels below each root
    #[arg(long = "depth", value_name = "N")]
    depth: Option<usize>,

    /// Select hidden items instead of non-hidden ones
    #[arg(long = "hidden")]
    hidden: bool,

    /// Select hidden and non-hidden items alike
    #[arg(long = "force")]
    force: bool,

    /// List what the rules exclude instead of what they keep
    #[arg(long = "ignored")]
    ignored: bool,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Terminate each path with NUL instead of newline
    #[arg(short = '0', long = "null", conflicts_with = "json")]
    null: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Print directory and file counts to stderr when done
    #[arg(long = "summary")]
    summary: bool,

    /// Log rule loading and traversal to stderr
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

impl Args {
    fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            ignore_file_name: self.ignore_file_name.clone(),
            ignore_patterns: self.ignore_pattern.clone(),
            include_ignore_files: self.include_ignore_files,
            mode: if self.directory {
                OutputMode::Directories
            } else {
                OutputMode::Files
            },
            max_depth: self.depth,
            hidden: self.hidden,
            force: self.force,
            ignored: self.ignored,
        }
    }
}

fn init_logging(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default))
        .context("invalid log filter")?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(&args) {
        Ok(summary) if summary.errors == 0 => ExitCode::SUCCESS,
        Ok(_) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("sift: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<WalkSummary> {
    init_logging(args.verbose)?;

    let walker = Walker::new(args.walker_config());
    let roots = resolve_roots(&args.paths, args.literal_path);

    let summary = if args.json {
        let mut formatter = JsonFormatter::stdout();
        walk_roots(&walker, roots, &mut formatter)?
    } else {
        let config = OutputConfig {
            use_color: should_use_color(args.color),
            null_terminated: args.null,
        };
        let mut formatter = PlainFormatter::stdout(config);
        walk_roots(&walker, roots, &mut formatter)?
    };

    if args.summary {
        eprintln!(
            "{} directories, {} files",
            summary.directories, summary.files
        );
    }
    Ok(summary)
}

/// Walk each root in order into one output. Per-root failures are reported
/// and counted; only a failing output stops early.
fn walk_roots<O: WalkOutput>(
    walker: &Walker,
    roots: Vec<std::result::Result<PathBuf, WalkError>>,
    output: &mut O,
) -> Result<WalkSummary> {
    let mut summary = WalkSummary::default();
    for root in roots {
        let result = root.and_then(|root| walker.walk(&root, output));
        match result {
            Ok(walked) => summary.merge(walked),
            Err(WalkError::Output(e)) if is_broken_pipe(&e) => {
                debug!("output closed, stopping");
                return Ok(summary);
            }
            Err(e @ WalkError::Output(_)) => return Err(e.into()),
            Err(e) => {
                output.report_error(&e);
                summary.errors += 1;
            }
        }
    }
    match output.finish(&summary) {
        Err(e) if is_broken_pipe(&e) => debug!("output closed, stopping"),
        result => result.context("error writing output")?,
    }
    Ok(summary)
}

/// A reader that stops early (`sift | head`) is a normal way to end a walk.
fn is_broken_pipe(error: &io::Error) -> bool {
    error.kind() == io::ErrorKind::BrokenPipe
}
