//! Worker unit logic
//!
//! Each worker:
//! - Is started lazily by a submit that found a free slot
//! - Claims file paths from the work queue until it is empty
//! - Tokenizes each file line by line and feeds the tracker
//! - Retires on the first empty claim and, if it was the last one out
//!   after producers finished, fires the completion signal
//!
//! A failing or panicking file is reported and skipped; it never takes
//! the worker or the pool down with it.

use crate::error::{FileError, FileOutcome, FileResult, WorkerError};
use crate::tokenize::words;
use crate::tracker::FrequencyTracker;
use crate::walker::pool::PoolShared;
use crate::walker::queue::Claim;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace, warn};

/// Statistics collected across all workers of a pool
#[derive(Debug, Default)]
pub struct WorkerStats {
    /// Files tokenized successfully
    pub files_processed: AtomicU64,

    /// Files skipped after an error
    pub files_skipped: AtomicU64,

    /// Words recorded
    pub words_counted: AtomicU64,

    /// Bytes read from processed files
    pub bytes_read: AtomicU64,

    /// Files whose processing panicked
    pub panics: AtomicU64,
}

impl WorkerStats {
    fn record_file(&self, words: u64, bytes: u64) {
        self.files_processed.fetch_add(1, Ordering::Relaxed);
        self.words_counted.fetch_add(words, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    fn record_skip(&self) {
        self.files_skipped.fetch_add(1, Ordering::Relaxed);
    }

    fn record_panic(&self) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.files_processed.load(Ordering::Relaxed)
    }

    pub fn skipped(&self) -> u64 {
        self.files_skipped.load(Ordering::Relaxed)
    }

    pub fn words(&self) -> u64 {
        self.words_counted.load(Ordering::Relaxed)
    }

    pub fn bytes(&self) -> u64 {
        self.bytes_read.load(Ordering::Relaxed)
    }
}

/// Main worker loop
pub(crate) fn worker_loop(id: usize, shared: &PoolShared) {
    debug!(worker = id, "Worker starting");
    let mut handled = 0u64;

    loop {
        let path = match shared.queue.claim_or_retire() {
            Claim::Path(path) => path,
            Claim::Retired { quiescent } => {
                debug!(worker = id, files = handled, "Worker retiring");
                if quiescent {
                    debug!(worker = id, "Last worker out, signalling completion");
                    shared.completion.fire();
                }
                return;
            }
        };

        handled += 1;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            process_file(&path, &shared.tracker)
        }));

        match outcome {
            Ok(FileOutcome::Processed { path, words, bytes }) => {
                shared.stats.record_file(words, bytes);
                trace!(worker = id, path = %path.display(), words = words, "File processed");
            }
            Ok(FileOutcome::Skipped { path, error }) => {
                shared.stats.record_skip();
                warn!(worker = id, path = %path.display(), error = %error, "File skipped");
            }
            Err(_) => {
                shared.stats.record_skip();
                shared.stats.record_panic();
                let err = WorkerError::Panicked {
                    id,
                    message: format!("while processing '{}'", path.display()),
                };
                warn!(error = %err, "File skipped");
            }
        }
    }
}

/// Tokenize one file into the tracker
///
/// The whole file is read and decoded before any word is recorded, so a
/// skipped file contributes nothing to the counts.
pub fn process_file(path: &Path, tracker: &FrequencyTracker) -> FileOutcome {
    match read_text(path) {
        Ok(text) => {
            debug!(path = %path.display(), "Parsing text file");
            let word_count: u64 = text
                .lines()
                .map(|line| tracker.record_all(words(line)))
                .sum();

            FileOutcome::Processed {
                path: path.to_path_buf(),
                words: word_count,
                bytes: text.len() as u64,
            }
        }
        Err(error) => FileOutcome::Skipped {
            path: path.to_path_buf(),
            error,
        },
    }
}

fn read_text(path: &Path) -> FileResult<String> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => FileError::NotAFile {
            path: path.to_path_buf(),
        },
        _ => FileError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    if !metadata.is_file() {
        return Err(FileError::NotAFile {
            path: path.to_path_buf(),
        });
    }

    let bytes = fs::read(path).map_err(|source| FileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    String::from_utf8(bytes).map_err(|e| {
        let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
        FileError::Decode {
            path: path.to_path_buf(),
            line: valid.iter().filter(|&&b| b == b'\n').count() + 1,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_worker_stats() {
        let stats = WorkerStats::default();

        stats.record_file(10, 1024);
        stats.record_skip();
        stats.record_panic();

        assert_eq!(stats.processed(), 1);
        assert_eq!(stats.words(), 10);
        assert_eq!(stats.bytes(), 1024);
        assert_eq!(stats.skipped(), 1);
        assert_eq!(stats.panics.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_process_file_counts_words() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.txt");
        fs::write(&path, "the cat sat\non the Mat\n\nI x\n").unwrap();

        let tracker = FrequencyTracker::new(10);
        let outcome = process_file(&path, &tracker);

        match outcome {
            FileOutcome::Processed { words, bytes, .. } => {
                assert_eq!(words, 6);
                assert_eq!(bytes, 28);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(tracker.count("the"), 2);
        assert_eq!(tracker.count("mat"), 1);
        assert_eq!(tracker.count("i"), 0);
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempdir().unwrap();
        let tracker = FrequencyTracker::new(10);

        let outcome = process_file(&dir.path().join("gone.txt"), &tracker);
        assert!(matches!(
            outcome,
            FileOutcome::Skipped {
                error: FileError::NotAFile { .. },
                ..
            }
        ));

        // A directory is not a regular file either
        let outcome = process_file(dir.path(), &tracker);
        assert!(matches!(outcome, FileOutcome::Skipped { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_skipped_whole() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bin.txt");
        fs::write(&path, b"good words here\nbad \xff\xfe bytes\n").unwrap();

        let tracker = FrequencyTracker::new(10);
        let outcome = process_file(&path, &tracker);

        match outcome {
            FileOutcome::Skipped {
                error: FileError::Decode { line, .. },
                ..
            } => assert_eq!(line, 2),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(tracker.total_words(), 0);
    }
}
