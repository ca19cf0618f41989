//! Work queue with lazy worker accounting
//!
//! This module holds the pending file paths together with the live
//! worker count and the run phase. All three sit behind one lock so
//! that "queue is empty", "no workers are live" and "no more files will
//! arrive" are always observed together.
//!
//! Workers never wait for work. A worker that finds the queue empty
//! retires in the same critical section, so a concurrent submit either
//! sees the freed slot and asks for a new worker, or has its path
//! claimed by a worker that is still live.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Producers may still submit
    Running,

    /// Producers are finished, waiting for workers to drain
    AwaitingEnd,

    /// Terminal; completion has been signalled
    Done,
}

/// What happened to a submitted path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Queued; enough workers are live to pick it up
    Queued,

    /// Queued and a worker slot was reserved; the caller must start a worker
    QueuedWithWorker,

    /// Not queued (run cancelled or already finished)
    Dropped,
}

/// Result of a worker asking for its next path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// Process this path
    Path(PathBuf),

    /// Queue was empty; the worker has been retired.
    /// `quiescent` is true for exactly one retirement per run.
    Retired { quiescent: bool },
}

/// Statistics for the work queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total paths enqueued
    pub enqueued: AtomicU64,

    /// Total paths claimed by workers
    pub dequeued: AtomicU64,

    /// Worker units started
    pub workers_spawned: AtomicU64,

    /// Paths dropped by cancellation or late submission
    pub dropped: AtomicU64,
}

impl QueueStats {
    /// Get queue throughput (claimed paths)
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Get number of worker units started
    pub fn spawned(&self) -> u64 {
        self.workers_spawned.load(Ordering::Relaxed)
    }

    /// Get number of dropped paths
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
struct QueueState {
    pending: VecDeque<PathBuf>,
    live_workers: usize,
    phase: Phase,
    cancelled: bool,
}

impl QueueState {
    /// Move to Done if producers are finished and everything has drained
    fn try_finish(&mut self) -> bool {
        if self.phase == Phase::AwaitingEnd && self.live_workers == 0 && self.pending.is_empty() {
            self.phase = Phase::Done;
            true
        } else {
            false
        }
    }
}

/// Unbounded queue of pending files plus worker bookkeeping
#[derive(Debug)]
pub struct WorkQueue {
    state: Mutex<QueueState>,
    max_workers: usize,
    stats: QueueStats,
}

impl WorkQueue {
    /// Create a queue that admits at most `max_workers` live workers
    pub fn new(max_workers: usize) -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                live_workers: 0,
                phase: Phase::Running,
                cancelled: false,
            }),
            max_workers,
            stats: QueueStats::default(),
        }
    }

    /// Append a path and reserve a worker slot if the pool has room
    pub fn push(&self, path: PathBuf) -> Admission {
        let mut state = self.state.lock();

        if state.cancelled || state.phase == Phase::Done {
            self.stats.dropped.fetch_add(1, Ordering::Relaxed);
            return Admission::Dropped;
        }

        state.pending.push_back(path);
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);

        if state.live_workers < self.max_workers {
            state.live_workers += 1;
            self.stats.workers_spawned.fetch_add(1, Ordering::Relaxed);
            Admission::QueuedWithWorker
        } else {
            Admission::Queued
        }
    }

    /// Claim the next path, or retire the calling worker if there is none
    pub fn claim_or_retire(&self) -> Claim {
        let mut state = self.state.lock();

        if let Some(path) = state.pending.pop_front() {
            self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
            return Claim::Path(path);
        }

        state.live_workers = state.live_workers.saturating_sub(1);
        Claim::Retired {
            quiescent: state.try_finish(),
        }
    }

    /// Declare that no producer will submit again
    ///
    /// Returns true if this call observed quiescence and moved the run to
    /// [`Phase::Done`]. Calling it again is harmless.
    pub fn declare_no_more_producers(&self) -> bool {
        let mut state = self.state.lock();
        if state.phase == Phase::Running {
            state.phase = Phase::AwaitingEnd;
        }
        state.try_finish()
    }

    /// Drop all pending paths and refuse further submissions
    ///
    /// Returns the number of paths discarded. Live workers finish their
    /// current file and retire normally.
    pub fn cancel(&self) -> usize {
        let mut state = self.state.lock();
        state.cancelled = true;
        let dropped = state.pending.len();
        state.pending.clear();
        self.stats.dropped.fetch_add(dropped as u64, Ordering::Relaxed);
        dropped
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    #[cfg(test)]
    fn is_cancelled(&self) -> bool {
        self.state.lock().cancelled
    }

    /// Number of live workers
    pub fn live_workers(&self) -> usize {
        self.state.lock().live_workers
    }

    /// Worker limit
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.state.lock().pending.is_empty()
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Get queue statistics
    pub fn stats(&self) -> &QueueStats {
        &self.stats
    }
}
