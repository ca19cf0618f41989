//! Lazily grown worker pool and quiescence detection
//!
//! Workers are never pre-spawned. Every submit re-checks whether the pool
//! is below capacity and, if so, starts one more worker. Workers exit as
//! soon as they see an empty queue instead of sleeping, so a later submit
//! may start a replacement even if `max_workers` existed moments ago.
//!
//! Completion is detected by whichever side observes, under the queue
//! lock, that producers are finished, no worker is live and nothing is
//! pending: either the last retiring worker or the declaration itself.

use crate::error::WorkerError;
use crate::tracker::FrequencyTracker;
use crate::walker::completion::Completion;
use crate::walker::queue::{Admission, Phase, WorkQueue};
use crate::walker::worker::{worker_loop, WorkerStats};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// State shared between the pool handle and its workers
pub(crate) struct PoolShared {
    pub(crate) queue: WorkQueue,
    pub(crate) tracker: Arc<FrequencyTracker>,
    pub(crate) completion: Arc<Completion>,
    pub(crate) stats: WorkerStats,
    handles: Mutex<Vec<(usize, JoinHandle<()>)>>,
    failures: Mutex<Vec<WorkerError>>,
    next_id: AtomicUsize,
}

/// Bounded pool of file-processing workers
#[derive(Clone)]
pub struct WorkerPool {
    shared: Arc<PoolShared>,
}

impl WorkerPool {
    /// Create a pool of at most `max_workers` concurrent workers
    pub fn new(
        max_workers: usize,
        tracker: Arc<FrequencyTracker>,
        completion: Arc<Completion>,
    ) -> Self {
        Self {
            shared: Arc::new(PoolShared {
                queue: WorkQueue::new(max_workers),
                tracker,
                completion,
                stats: WorkerStats::default(),
                handles: Mutex::new(Vec::new()),
                failures: Mutex::new(Vec::new()),
                next_id: AtomicUsize::new(0),
            }),
        }
    }

    /// Queue a file, starting a worker if the pool has a free slot
    pub fn submit(&self, path: PathBuf) -> Admission {
        trace!(path = %path.display(), "Adding file to queue");

        let admission = self.shared.queue.push(path);
        if admission == Admission::QueuedWithWorker {
            self.spawn_worker();
        }
        admission
    }

    /// Tell the pool that no producer will submit again
    ///
    /// Fires completion immediately if the pool is already drained;
    /// otherwise the last retiring worker will.
    pub fn declare_no_more_producers(&self) {
        debug!(
            pending = self.shared.queue.len(),
            live = self.shared.queue.live_workers(),
            "No more producers"
        );
        if self.shared.queue.declare_no_more_producers() {
            self.shared.completion.fire();
        }
    }

    /// Drop pending files and refuse new ones
    pub fn cancel(&self) -> usize {
        let dropped = self.shared.queue.cancel();
        if dropped > 0 {
            warn!(dropped = dropped, "Cancelled with files still queued");
        }
        dropped
    }

    /// Join every worker thread that has been started so far
    ///
    /// Returns the failures seen, including those reaped earlier.
    pub fn join_workers(&self) -> Vec<WorkerError> {
        let handles = std::mem::take(&mut *self.shared.handles.lock());
        for (id, handle) in handles {
            self.reap(id, handle);
        }
        std::mem::take(&mut *self.shared.failures.lock())
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.shared.queue
    }

    pub fn stats(&self) -> &WorkerStats {
        &self.shared.stats
    }

    pub fn tracker(&self) -> &Arc<FrequencyTracker> {
        &self.shared.tracker
    }

    pub fn completion(&self) -> &Arc<Completion> {
        &self.shared.completion
    }

    /// Whether completion has been reached
    pub fn is_done(&self) -> bool {
        self.shared.queue.phase() == Phase::Done
    }

    /// Start a worker on the slot the queue just reserved
    fn spawn_worker(&self) {
        let id = self.shared.next_id.fetch_add(1, Ordering::Relaxed);
        let shared = Arc::clone(&self.shared);

        let spawned = thread::Builder::new()
            .name(format!("wordfreq-worker-{}", id))
            .spawn(move || worker_loop(id, &shared));

        match spawned {
            Ok(handle) => {
                let mut handles = self.shared.handles.lock();
                // Reap finished workers so respawns don't pile up handles
                let (finished, running): (Vec<_>, Vec<_>) = std::mem::take(&mut *handles)
                    .into_iter()
                    .partition(|(_, h)| h.is_finished());
                *handles = running;
                handles.push((id, handle));
                drop(handles);

                for (id, handle) in finished {
                    self.reap(id, handle);
                }
            }
            Err(e) => {
                // The slot is already reserved, so drain on this thread instead
                let err = WorkerError::SpawnFailed {
                    id,
                    reason: e.to_string(),
                };
                warn!(error = %err, "Running worker inline");
                self.shared.failures.lock().push(err);
                worker_loop(id, &self.shared);
            }
        }
    }

    fn reap(&self, id: usize, handle: JoinHandle<()>) {
        if handle.join().is_err() {
            let err = WorkerError::Panicked {
                id,
                message: "Worker thread panicked".into(),
            };
            warn!(error = %err, "Worker failed to join cleanly");
            self.shared.failures.lock().push(err);
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("max_workers", &self.shared.queue.max_workers())
            .field("live_workers", &self.shared.queue.live_workers())
            .field("pending", &self.shared.queue.len())
            .field("phase", &self.shared.queue.phase())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tempfile::tempdir;

    fn counting_pool(max_workers: usize) -> (WorkerPool, Arc<AtomicUsize>) {
        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = Arc::clone(&fired);
        let completion = Arc::new(Completion::with_callback(move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        }));
        let pool = WorkerPool::new(max_workers, Arc::new(FrequencyTracker::new(10)), completion);
        (pool, fired)
    }

    #[test]
    fn test_empty_run_completes_on_declaration() {
        let (pool, fired) = counting_pool(3);
        pool.declare_no_more_producers();

        assert!(pool.completion().wait_timeout(Duration::from_secs(5)));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(pool.is_done());
        assert_eq!(pool.stats().processed(), 0);
    }

    #[test]
    fn test_counts_across_workers() {
        let dir = tempdir().unwrap();
        let (pool, fired) = counting_pool(3);

        for i in 0..20 {
            let path = dir.path().join(format!("{}.txt", i));
            fs::write(&path, "alpha beta beta\ngamma").unwrap();
            pool.submit(path);
        }
        pool.declare_no_more_producers();

        assert!(pool.completion().wait_timeout(Duration::from_secs(10)));
        assert!(pool.join_workers().is_empty());

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(pool.stats().processed(), 20);
        assert_eq!(pool.stats().words(), 80);
        assert_eq!(pool.tracker().count("beta"), 40);
        assert!(pool.queue().stats().spawned() >= 1);
        assert_eq!(pool.queue().live_workers(), 0);
    }

    #[test]
    fn test_bad_file_does_not_stop_pool() {
        let dir = tempdir().unwrap();
        let (pool, fired) = counting_pool(2);

        let good = dir.path().join("good.txt");
        fs::write(&good, "hello world").unwrap();
        pool.submit(dir.path().join("missing.txt"));
        pool.submit(good);
        pool.declare_no_more_producers();

        assert!(pool.completion().wait_timeout(Duration::from_secs(5)));
        pool.join_workers();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(pool.stats().processed(), 1);
        assert_eq!(pool.stats().skipped(), 1);
        assert_eq!(pool.tracker().count("hello"), 1);
    }

    #[test]
    fn test_concurrent_submitters_fire_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("shared.txt");
        fs::write(&path, "word").unwrap();

        for max_workers in 1..=4 {
            let (pool, fired) = counting_pool(max_workers);
            let producers: Vec<_> = (0..4)
                .map(|_| {
                    let pool = pool.clone();
                    let path = path.clone();
                    thread::spawn(move || {
                        for _ in 0..50 {
                            pool.submit(path.clone());
                        }
                    })
                })
                .collect();
            for producer in producers {
                producer.join().unwrap();
            }
            pool.declare_no_more_producers();

            assert!(pool.completion().wait_timeout(Duration::from_secs(10)));
            pool.join_workers();

            assert_eq!(fired.load(Ordering::SeqCst), 1);
            assert_eq!(pool.queue().stats().throughput(), 200);
            assert_eq!(pool.tracker().count("word"), 200);
        }
    }

    #[test]
    fn test_cancel_still_completes() {
        let dir = tempdir().unwrap();
        let (pool, fired) = counting_pool(1);

        for i in 0..10 {
            let path = dir.path().join(format!("{}.txt", i));
            fs::write(&path, "some text").unwrap();
            pool.submit(path);
        }
        pool.cancel();
        pool.declare_no_more_producers();

        assert!(pool.completion().wait_timeout(Duration::from_secs(5)));
        pool.join_workers();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(
            pool.stats().processed() + pool.queue().stats().dropped_count(),
            10
        );
    }
}
