//! Error types for wordfreq-walker
//!
//! This module defines the error hierarchy for a run:
//! - Fatal errors that abort the run before any work is queued
//! - Per-file errors that are reported and skipped
//! - Configuration and CLI errors
//! - Worker thread errors
//!
//! Design philosophy:
//! - Use thiserror for structured error types in library code
//! - A bad file never takes down the pool; only a bad root is fatal
//! - Preserve error chains for debugging

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the wordfreq-walker application
#[derive(Error, Debug)]
pub enum WalkerError {
    /// Root path is missing or not a directory
    #[error("'{}' is not a valid directory", .path.display())]
    InvalidRoot { path: PathBuf },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Worker/concurrency errors
    #[error("Worker error: {0}")]
    Worker(#[from] WorkerError),

    /// I/O errors (reading input, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while processing a single queued file
#[derive(Error, Debug)]
pub enum FileError {
    /// Queued path is no longer a regular file (removed or replaced mid-run)
    #[error("'{}' is not a valid file", .path.display())]
    NotAFile { path: PathBuf },

    /// Open or read failed
    #[error("Failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Contents are not valid UTF-8
    #[error("'{}' is not valid UTF-8 text (line {line})", .path.display())]
    Decode { path: PathBuf, line: usize },
}

/// Configuration and CLI errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid top-K size
    #[error("Invalid top count {count}: must be between 1 and {max}")]
    InvalidTopCount { count: usize, max: usize },

    /// Invalid file pattern
    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// No root path given
    #[error("A root path is required")]
    MissingRoot,
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker panicked
    #[error("Worker {id} panicked: {message}")]
    Panicked { id: usize, message: String },

    /// Thread could not be started
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Discovery thread panicked
    #[error("Discovery thread panicked")]
    DiscoveryPanicked,
}

/// Result type alias for WalkerError
pub type Result<T> = std::result::Result<T, WalkerError>;

/// Result type alias for FileError
pub type FileResult<T> = std::result::Result<T, FileError>;

/// Represents the outcome of processing a single file
#[derive(Debug)]
pub enum FileOutcome {
    /// All lines were tokenized and recorded
    Processed {
        path: PathBuf,
        words: u64,
        bytes: u64,
    },

    /// Skipped due to a per-file error
    Skipped { path: PathBuf, error: FileError },
}
