//! Configuration types for wordfreq-walker
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::tracker::DEFAULT_TOP_K;
use clap::Parser;
use regex::Regex;
use std::path::PathBuf;
use std::sync::LazyLock;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Maximum number of ranked words
const MAX_TOP_K: usize = 1000;

/// Default worker count
pub const DEFAULT_WORKERS: usize = 3;

/// Default pattern for text file names
pub const DEFAULT_PATTERN: &str = r"\.txt$";

/// Compiled default pattern
static TEXT_FILE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(DEFAULT_PATTERN).expect("Invalid text file regex"));

/// Report the most frequent words across the text files under a directory
#[derive(Parser, Debug, Clone)]
#[command(
    name = "wordfreq-walker",
    version,
    about = "Report the most frequent words across the text files under a directory",
    long_about = "Walks a directory tree, tokenizes every matching text file with a bounded \
                  pool of worker threads and prints the most frequent words.\n\n\
                  A word is a run of at least two ASCII letters or digits; counting is case-insensitive.",
    after_help = "EXAMPLES:\n    \
        wordfreq-walker ./corpus\n    \
        wordfreq-walker ./corpus -w 8 -k 25\n    \
        wordfreq-walker ./logs --pattern '\\.(txt|log)$' -q"
)]
pub struct CliArgs {
    /// Directory to search (prompted for on stdin if omitted)
    #[arg(value_name = "ROOT")]
    pub root: Option<PathBuf>,

    /// Maximum number of concurrent worker threads
    #[arg(short = 'w', long, default_value_t = DEFAULT_WORKERS, value_name = "NUM")]
    pub workers: usize,

    /// Number of top words to report
    #[arg(short = 'k', long = "top", default_value_t = DEFAULT_TOP_K, value_name = "NUM")]
    pub top: usize,

    /// Regex matched against file names to select text files
    #[arg(long, default_value = DEFAULT_PATTERN, value_name = "REGEX")]
    pub pattern: String,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (per-file debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Directory to walk
    pub root: PathBuf,

    /// Maximum concurrently live workers
    pub worker_count: usize,

    /// Number of ranked words
    pub top_k: usize,

    /// Compiled file name pattern
    pub file_pattern: Regex,

    /// Show progress indicator
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,
}

impl WalkConfig {
    /// Create and validate configuration from CLI arguments
    ///
    /// `args.root` must be filled in; the binary prompts for it first.
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let root = args.root.ok_or(ConfigError::MissingRoot)?;

        let mut config = Self::new(root);
        config.worker_count = args.workers;
        config.top_k = args.top;
        config.file_pattern =
            Regex::new(&args.pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: args.pattern.clone(),
                reason: e.to_string(),
            })?;
        config.show_progress = !args.quiet;
        config.verbose = args.verbose;

        config.validate()?;
        Ok(config)
    }

    /// Default configuration for `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            worker_count: DEFAULT_WORKERS,
            top_k: DEFAULT_TOP_K,
            file_pattern: TEXT_FILE_REGEX.clone(),
            show_progress: false,
            verbose: false,
        }
    }

    /// Check limits on numeric settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 || self.worker_count > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.worker_count,
                max: MAX_WORKERS,
            });
        }

        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(ConfigError::InvalidTopCount {
                count: self.top_k,
                max: MAX_TOP_K,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["wordfreq-walker"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_defaults() {
        let config = WalkConfig::from_args(args(&["/data"])).unwrap();
        assert_eq!(config.root, PathBuf::from("/data"));
        assert_eq!(config.worker_count, 3);
        assert_eq!(config.top_k, 10);
        assert!(config.show_progress);
        assert!(config.file_pattern.is_match("a.txt"));
        assert!(!config.file_pattern.is_match("a.txt.bak"));
    }

    #[test]
    fn test_flags() {
        let config =
            WalkConfig::from_args(args(&["/data", "-w", "8", "-k", "25", "-q", "--pattern", r"\.md$"]))
                .unwrap();
        assert_eq!(config.worker_count, 8);
        assert_eq!(config.top_k, 25);
        assert!(!config.show_progress);
        assert!(config.file_pattern.is_match("README.md"));
    }

    #[test]
    fn test_missing_root() {
        let err = WalkConfig::from_args(args(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot));
    }

    #[test]
    fn test_invalid_worker_count() {
        let err = WalkConfig::from_args(args(&["/data", "-w", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { count: 0, .. }));

        let err = WalkConfig::from_args(args(&["/data", "-w", "9999"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidWorkerCount { .. }));
    }

    #[test]
    fn test_invalid_top() {
        let err = WalkConfig::from_args(args(&["/data", "-k", "0"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTopCount { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = WalkConfig::from_args(args(&["/data", "--pattern", "(unclosed"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }
}
