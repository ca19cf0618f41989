//! Concurrent word-count engine
//!
//! # Architecture
//!
//! ```text
//!   ┌──────────────────────┐
//!   │      Discoverer      │   one producer thread, depth-first walk
//!   └──────────┬───────────┘
//!              │ submit(path)  (starts a worker if a slot is free)
//!              ▼
//!   ┌──────────────────────┐
//!   │      WorkQueue       │   pending paths + live workers + phase
//!   └──────────┬───────────┘   (one lock)
//!              │ claim_or_retire()
//!    ┌─────────┼─────────┐
//!    ▼         ▼         ▼
//! ┌──────┐ ┌──────┐ ┌──────┐
//! │  W0  │ │  W1  │ │  Wn  │    exit on empty queue
//! └──┬───┘ └──┬───┘ └──┬───┘
//!    └────────┼────────┘
//!             ▼
//!   ┌──────────────────────┐
//!   │   FrequencyTracker   │   counts + bounded top-K (one lock)
//!   └──────────────────────┘
//! ```
//!
//! The coordinator waits for the discoverer, declares that no more
//! producers exist, and waits for the single completion signal fired by
//! whoever observes the drained, idle state first.

pub mod completion;
pub mod coordinator;
pub mod discover;
pub mod pool;
pub mod queue;
pub mod worker;

pub use completion::Completion;
pub use coordinator::{WalkProgress, WordCountCoordinator, WordCountResult};
pub use discover::{DiscoveryStats, Discoverer, PathSink};
pub use pool::WorkerPool;
pub use queue::{Admission, Claim, Phase, WorkQueue};
pub use worker::{process_file, WorkerStats};
