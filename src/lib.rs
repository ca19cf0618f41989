//! wordfreq-walker - Parallel word frequency scanner
//!
//! Walks a directory tree, tokenizes every text file with a lazily grown,
//! bounded pool of worker threads and reports the most frequent words.
//!
//! # Features
//!
//! - **Lazy Worker Pool**: Workers are started by incoming files, never
//!   pre-spawned, and exit as soon as the queue is empty.
//!
//! - **Incremental Top-K**: The ranking is maintained on every increment,
//!   so the final report never sorts the full vocabulary.
//!
//! - **Race-Free Completion**: The end of the run is detected exactly once,
//!   even when discovery and the last workers finish at the same moment.
//!
//! - **Per-File Isolation**: Unreadable, vanished or non-UTF-8 files are
//!   reported and skipped without stopping the run.
//!
//! # Example
//!
//! ```bash
//! # Top 10 words under ./corpus with 3 workers
//! wordfreq-walker ./corpus
//!
//! # Top 25 words with 8 workers, matching .txt and .log files
//! wordfreq-walker ./data -w 8 -k 25 --pattern '\.(txt|log)$'
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod tokenize;
pub mod tracker;
pub mod walker;

pub use config::{CliArgs, WalkConfig};
pub use error::{Result, WalkerError};
pub use tracker::{FrequencyTracker, WordCount};
pub use walker::{WordCountCoordinator, WordCountResult};
