//! Run coordinator - orchestrates discovery, the worker pool and completion
//!
//! The coordinator is responsible for:
//! - Validating the root before any work is queued
//! - Running the discoverer on its own thread and waiting for it
//! - Declaring the end of producers only after discovery returned
//! - Waiting for the single completion signal
//! - Progress reporting and signal-driven cancellation
//! - Final statistics and worker cleanup

use crate::config::WalkConfig;
use crate::error::{Result, WalkerError, WorkerError};
use crate::tracker::{FrequencyTracker, WordCount};
use crate::walker::completion::Completion;
use crate::walker::discover::{DiscoveryStats, Discoverer};
use crate::walker::pool::WorkerPool;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often progress is sampled while waiting
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Result of a completed run
#[derive(Debug, Clone)]
pub struct WordCountResult {
    /// Most frequent words, highest count first
    pub top_words: Vec<WordCount>,

    /// Distinct words seen
    pub unique_words: usize,

    /// Total words counted
    pub total_words: u64,

    /// Files submitted by discovery
    pub files_discovered: u64,

    /// Files tokenized
    pub files_processed: u64,

    /// Files skipped after an error
    pub files_skipped: u64,

    /// Bytes read from processed files
    pub bytes_read: u64,

    /// Worker units started over the run
    pub workers_spawned: u64,

    /// Directory entries discovery could not read
    pub discovery_errors: u64,

    /// Wall-clock start
    pub started_at: DateTime<Utc>,

    /// Time taken for the run
    pub duration: Duration,

    /// Whether the run completed (vs was interrupted)
    pub completed: bool,
}

/// Progress information for display
#[derive(Debug, Clone)]
pub struct WalkProgress {
    /// Files queued so far
    pub files_discovered: u64,

    /// Files tokenized
    pub files_processed: u64,

    /// Files skipped
    pub files_skipped: u64,

    /// Words counted
    pub words: u64,

    /// Current queue size
    pub queue_size: usize,

    /// Live workers
    pub active_workers: usize,

    /// Worker limit
    pub total_workers: usize,

    /// Elapsed time
    pub elapsed: Duration,
}

impl WalkProgress {
    /// Snapshot the pool's counters
    pub fn sample(pool: &WorkerPool, elapsed: Duration) -> Self {
        let queue = pool.queue();
        let stats = pool.stats();
        Self {
            files_discovered: queue.stats().enqueued.load(Ordering::Relaxed),
            files_processed: stats.processed(),
            files_skipped: stats.skipped(),
            words: stats.words(),
            queue_size: queue.len(),
            active_workers: queue.live_workers(),
            total_workers: queue.max_workers(),
            elapsed,
        }
    }

    /// Calculate files per second rate
    pub fn files_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            (self.files_processed + self.files_skipped) as f64 / secs
        } else {
            0.0
        }
    }

    /// Calculate words per second rate
    pub fn words_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.words as f64 / secs
        } else {
            0.0
        }
    }
}

type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Coordinates one word-count run
pub struct WordCountCoordinator {
    /// Configuration
    config: Arc<WalkConfig>,

    /// Shared frequency tracker
    tracker: Arc<FrequencyTracker>,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,

    /// Invoked once when all work is done
    on_complete: Option<CompletionCallback>,
}

impl WordCountCoordinator {
    /// Create a new coordinator
    pub fn new(config: WalkConfig) -> Result<Self> {
        config.validate()?;
        let tracker = Arc::new(FrequencyTracker::new(config.top_k));

        Ok(Self {
            config: Arc::new(config),
            tracker,
            shutdown: Arc::new(AtomicBool::new(false)),
            on_complete: None,
        })
    }

    /// Run `callback` exactly once when processing is fully done
    ///
    /// It runs on whichever thread observes completion, before `run`
    /// returns. Use [`tracker`](Self::tracker) to read the final ranking.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Get a clone of the shutdown flag (for signal handlers)
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.shutdown)
    }

    /// The tracker this run feeds
    pub fn tracker(&self) -> Arc<FrequencyTracker> {
        Arc::clone(&self.tracker)
    }

    /// Run to completion
    pub fn run(self) -> Result<WordCountResult> {
        self.run_with_progress(|_| {})
    }

    /// Run to completion, sampling progress while waiting
    pub fn run_with_progress<F>(mut self, mut on_progress: F) -> Result<WordCountResult>
    where
        F: FnMut(&WalkProgress),
    {
        let start_time = Instant::now();
        let started_at = Utc::now();

        let discoverer = Discoverer::new(&self.config.root, self.config.file_pattern.clone())
            .with_shutdown(Arc::clone(&self.shutdown));

        // Fatal before anything is queued
        discoverer.validate_root()?;

        info!(
            root = %self.config.root.display(),
            workers = self.config.worker_count,
            top = self.config.top_k,
            "Starting word count"
        );
        debug!(started_at = %started_at.to_rfc3339(), "Run started");

        let completion = Arc::new(match self.on_complete.take() {
            Some(callback) => Completion::with_callback(callback),
            None => Completion::new(),
        });
        let pool = WorkerPool::new(
            self.config.worker_count,
            Arc::clone(&self.tracker),
            Arc::clone(&completion),
        );

        let discovery = {
            let pool = pool.clone();
            thread::Builder::new()
                .name("wordfreq-discover".into())
                .spawn(move || discoverer.run(&pool))?
        };

        // Wait for the producer before declaring the end of producers
        let mut cancelled = false;
        while !discovery.is_finished() {
            self.poll(&pool, &mut cancelled, start_time, &mut on_progress);
            thread::sleep(POLL_INTERVAL);
        }
        let discovered = discovery
            .join()
            .map_err(|_| WalkerError::Worker(WorkerError::DiscoveryPanicked))
            .and_then(|result| result);

        let discovered = match discovered {
            Ok(stats) => stats,
            Err(e) => {
                // Drain what is already queued so no worker outlives the run
                pool.cancel();
                pool.declare_no_more_producers();
                completion.wait();
                pool.join_workers();
                return Err(e);
            }
        };

        pool.declare_no_more_producers();

        while !completion.wait_timeout(POLL_INTERVAL) {
            self.poll(&pool, &mut cancelled, start_time, &mut on_progress);
        }
        on_progress(&WalkProgress::sample(&pool, start_time.elapsed()));

        for failure in pool.join_workers() {
            warn!(error = %failure, "Worker failure during run");
        }

        let result = self.collect(&pool, &discovered, cancelled, started_at, start_time.elapsed());

        info!(
            files = result.files_processed,
            skipped = result.files_skipped,
            words = result.total_words,
            unique = result.unique_words,
            duration_secs = result.duration.as_secs(),
            "Word count completed"
        );

        Ok(result)
    }

    /// Report progress and honour the shutdown flag
    fn poll<F>(&self, pool: &WorkerPool, cancelled: &mut bool, start: Instant, on_progress: &mut F)
    where
        F: FnMut(&WalkProgress),
    {
        if !*cancelled && self.shutdown.load(Ordering::Relaxed) {
            info!("Shutdown signal received");
            pool.cancel();
            *cancelled = true;
        }
        on_progress(&WalkProgress::sample(pool, start.elapsed()));
    }

    fn collect(
        &self,
        pool: &WorkerPool,
        discovered: &DiscoveryStats,
        cancelled: bool,
        started_at: DateTime<Utc>,
        duration: Duration,
    ) -> WordCountResult {
        let stats = pool.stats();
        let interrupted = cancelled || discovered.cancelled || self.shutdown.load(Ordering::Relaxed);

        WordCountResult {
            top_words: self.tracker.snapshot_top_k(),
            unique_words: self.tracker.unique_words(),
            total_words: self.tracker.total_words(),
            files_discovered: discovered.files_submitted,
            files_processed: stats.processed(),
            files_skipped: stats.skipped(),
            bytes_read: stats.bytes(),
            workers_spawned: pool.queue().stats().spawned(),
            discovery_errors: discovered.errors,
            started_at,
            duration,
            completed: !interrupted,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walk_progress_rates() {
        let progress = WalkProgress {
            files_discovered: 1200,
            files_processed: 900,
            files_skipped: 100,
            words: 50_000,
            queue_size: 200,
            active_workers: 3,
            total_workers: 3,
            elapsed: Duration::from_secs(10),
        };

        assert!((progress.files_per_second() - 100.0).abs() < 0.1);
        assert!((progress.words_per_second() - 5000.0).abs() < 0.1);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = WalkConfig::new("/tmp");
        config.worker_count = 0;
        assert!(matches!(
            WordCountCoordinator::new(config),
            Err(WalkerError::Config(_))
        ));
    }
}
