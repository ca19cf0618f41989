//! Text file discovery
//!
//! A single producer that walks the tree depth-first from the root and
//! submits every regular file whose name matches the configured pattern.
//! It runs to completion on its own thread; returning is the signal the
//! coordinator waits on before declaring that no more files will arrive.

use crate::error::{Result, WalkerError};
use crate::walker::pool::WorkerPool;
use crate::walker::queue::Admission;
use regex::Regex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Anything that accepts discovered paths
pub trait PathSink {
    fn submit(&self, path: PathBuf) -> Admission;
}

impl PathSink for WorkerPool {
    fn submit(&self, path: PathBuf) -> Admission {
        WorkerPool::submit(self, path)
    }
}

/// Counters for one discovery pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveryStats {
    /// Directories entered (including the root)
    pub dirs: u64,

    /// Files that matched and were submitted
    pub files_submitted: u64,

    /// Files that did not match the pattern
    pub files_ignored: u64,

    /// Entries that could not be read
    pub errors: u64,

    /// Whether the walk stopped early
    pub cancelled: bool,
}

/// Depth-first walker feeding a [`PathSink`]
#[derive(Debug)]
pub struct Discoverer {
    root: PathBuf,
    pattern: Regex,
    shutdown: Arc<AtomicBool>,
}

impl Discoverer {
    pub fn new(root: impl Into<PathBuf>, pattern: Regex) -> Self {
        Self {
            root: root.into(),
            pattern,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Stop early when `shutdown` is set
    pub fn with_shutdown(mut self, shutdown: Arc<AtomicBool>) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Fail unless the root is a directory
    pub fn validate_root(&self) -> Result<()> {
        if self.root.is_dir() {
            Ok(())
        } else {
            Err(WalkerError::InvalidRoot {
                path: self.root.clone(),
            })
        }
    }

    /// Whether a file name matches the text-file pattern
    pub fn matches(&self, name: &str) -> bool {
        self.pattern.is_match(name)
    }

    /// Walk the tree, submitting matching files to `sink`
    pub fn run<S: PathSink>(&self, sink: &S) -> Result<DiscoveryStats> {
        self.validate_root()?;

        info!(root = %self.root.display(), "Starting discovery");
        let mut stats = DiscoveryStats::default();

        let walker = WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            if self.shutdown.load(Ordering::Relaxed) {
                stats.cancelled = true;
                break;
            }

            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    stats.errors += 1;
                    warn!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let file_type = entry.file_type();
            if file_type.is_dir() {
                stats.dirs += 1;
                continue;
            }
            if !file_type.is_file() {
                continue;
            }

            if !self.matches(&entry.file_name().to_string_lossy()) {
                stats.files_ignored += 1;
                continue;
            }

            debug!(path = %entry.path().display(), "Found text file");
            match sink.submit(entry.into_path()) {
                Admission::Dropped => {
                    stats.cancelled = true;
                    break;
                }
                Admission::Queued | Admission::QueuedWithWorker => stats.files_submitted += 1,
            }
        }

        info!(
            dirs = stats.dirs,
            files = stats.files_submitted,
            errors = stats.errors,
            "Discovery finished"
        );
        Ok(stats)
    }
}
