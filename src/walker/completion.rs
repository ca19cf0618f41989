//! Single-shot completion signal
//!
//! Fired once when the run reaches quiescence. Firing runs the optional
//! callback and then drops the channel sender, which wakes every waiter
//! at once. A panicking callback is logged and still releases waiters.

use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use parking_lot::Mutex;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::error;

type Callback = Box<dyn FnOnce() + Send>;

/// One-resolution completion event
pub struct Completion {
    sender: Mutex<Option<Sender<()>>>,
    receiver: Receiver<()>,
    callback: Mutex<Option<Callback>>,
    fired: AtomicBool,
}

impl Completion {
    /// Create a signal with no callback
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
            callback: Mutex::new(None),
            fired: AtomicBool::new(false),
        }
    }

    /// Create a signal that runs `callback` when fired
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let completion = Self::new();
        *completion.callback.lock() = Some(Box::new(callback));
        completion
    }

    /// Fire the signal. Returns false if it had already fired.
    pub fn fire(&self) -> bool {
        if self
            .fired
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        // Held locally so waiters are released even if this frame unwinds
        let sender = self.sender.lock().take();

        let callback = self.callback.lock().take();
        if let Some(callback) = callback {
            if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
                error!("Completion callback panicked");
            }
        }

        // Disconnecting wakes all waiters
        drop(sender);
        true
    }

    /// Whether the signal has fired
    pub fn is_fired(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Block until fired
    pub fn wait(&self) {
        // Nothing is ever sent; recv returns once the sender is dropped
        let _ = self.receiver.recv();
    }

    /// Block until fired or `timeout` elapses. Returns true if fired.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => false,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Completion")
            .field("fired", &self.is_fired())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_fires_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let completion = Completion::with_callback(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!completion.is_fired());
        assert!(completion.fire());
        assert!(!completion.fire());
        assert!(completion.is_fired());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_wait_timeout_before_fire() {
        let completion = Completion::new();
        assert!(!completion.wait_timeout(Duration::from_millis(10)));
        completion.fire();
        assert!(completion.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_wakes_all_waiters() {
        let completion = Arc::new(Completion::new());
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let completion = Arc::clone(&completion);
                thread::spawn(move || completion.wait())
            })
            .collect();

        completion.fire();
        for waiter in waiters {
            waiter.join().unwrap();
        }
    }

    #[test]
    fn test_concurrent_fire() {
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = Arc::clone(&calls);
        let completion = Arc::new(Completion::with_callback(move || {
            calls_clone.fetch_add(1, Ordering::SeqCst);
        }));

        let winners: usize = (0..8)
            .map(|_| {
                let completion = Arc::clone(&completion);
                thread::spawn(move || completion.fire())
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| usize::from(h.join().unwrap()))
            .sum();

        assert_eq!(winners, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_callback_still_releases_waiters() {
        let completion = Arc::new(Completion::with_callback(|| {
            panic!("report failed");
        }));

        let firer = {
            let completion = Arc::clone(&completion);
            thread::spawn(move || completion.fire())
        };

        assert!(completion.wait_timeout(Duration::from_secs(5)));
        assert!(firer.join().unwrap());
        assert!(completion.is_fired());
        assert!(!completion.fire());
    }
}
