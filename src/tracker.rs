//! Word frequency tracking
//!
//! [`FrequencyTracker`] owns the full word -> count table and a bounded
//! [`TopK`] ranking that is updated on every increment, so the final
//! report never needs to sort the whole vocabulary. Both live behind a
//! single lock: a reader never sees a count that the ranking has not
//! caught up with.

use parking_lot::Mutex;
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashMap};

/// Default number of ranked words
pub const DEFAULT_TOP_K: usize = 10;

/// A word and the number of times it was seen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// Ranking key: higher count wins, and among equal counts the
/// lexicographically smaller word wins.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Ranked {
    count: u64,
    word: String,
}

impl Ranked {
    fn new(word: &str, count: u64) -> Self {
        Self {
            count,
            word: word.to_string(),
        }
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.word.cmp(&self.word))
    }
}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Bounded min-heap of the highest-ranked words
///
/// The heap root is the weakest entry and the first to be evicted.
/// Updates scan every slot for the candidate word, which is O(K) and
/// fine for the small K this is used with.
#[derive(Debug, Clone)]
pub struct TopK {
    capacity: usize,
    heap: BinaryHeap<Reverse<Ranked>>,
}

impl TopK {
    /// Create an empty ranking holding at most `capacity` words
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            heap: BinaryHeap::with_capacity(capacity),
        }
    }

    /// Offer `word` with its new `count`
    pub fn offer(&mut self, word: &str, count: u64) {
        if self.capacity == 0 {
            return;
        }

        // Already ranked: update the slot and restore heap order
        if self.heap.iter().any(|Reverse(slot)| slot.word == word) {
            let mut slots = std::mem::take(&mut self.heap).into_vec();
            if let Some(Reverse(slot)) = slots.iter_mut().find(|Reverse(slot)| slot.word == word) {
                slot.count = count;
            }
            self.heap = BinaryHeap::from(slots);
            return;
        }

        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(Ranked::new(word, count)));
            return;
        }

        // Full: only a strictly higher count displaces the minimum
        if let Some(mut min) = self.heap.peek_mut() {
            if count > min.0.count {
                *min = Reverse(Ranked::new(word, count));
            }
        }
    }

    /// Smallest count currently ranked
    #[cfg(test)]
    fn min_count(&self) -> Option<u64> {
        self.heap.peek().map(|Reverse(slot)| slot.count)
    }

    /// Whether `word` holds a slot
    #[cfg(test)]
    fn contains(&self, word: &str) -> bool {
        self.heap.iter().any(|Reverse(slot)| slot.word == word)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Ranked entries, highest count first, ties by word ascending
    pub fn sorted(&self) -> Vec<WordCount> {
        // Ascending order of Reverse<_> is descending rank
        self.heap
            .clone()
            .into_sorted_vec()
            .into_iter()
            .map(|Reverse(slot)| WordCount {
                word: slot.word,
                count: slot.count,
            })
            .collect()
    }
}

#[derive(Debug)]
struct TrackerState {
    counts: HashMap<String, u64>,
    top: TopK,
    unique_words: usize,
    total_words: u64,
}

impl TrackerState {
    fn record(&mut self, word: &str) -> u64 {
        let folded = word.to_lowercase();

        let count = match self.counts.get_mut(&folded) {
            Some(count) => {
                *count += 1;
                *count
            }
            None => {
                self.unique_words += 1;
                self.counts.insert(folded.clone(), 1);
                1
            }
        };
        self.total_words += 1;

        self.top.offer(&folded, count);
        count
    }
}

/// Thread-safe word counter with an incrementally maintained top-K
#[derive(Debug)]
pub struct FrequencyTracker {
    state: Mutex<TrackerState>,
}

impl FrequencyTracker {
    /// Create a tracker ranking the `k` most frequent words
    pub fn new(k: usize) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                counts: HashMap::new(),
                top: TopK::new(k),
                unique_words: 0,
                total_words: 0,
            }),
        }
    }

    /// Record one occurrence of `word`, returning its new count
    pub fn record(&self, word: &str) -> u64 {
        self.state.lock().record(word)
    }

    /// Record every word from `words` under one lock acquisition
    ///
    /// Each word is still counted and ranked atomically; batching only
    /// saves lock round-trips for a line's worth of words.
    pub fn record_all<'a, I>(&self, words: I) -> u64
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut state = self.state.lock();
        let mut recorded = 0;
        for word in words {
            state.record(word);
            recorded += 1;
        }
        recorded
    }

    /// Current ranking, highest count first
    ///
    /// Only final once the run has reached quiescence.
    pub fn snapshot_top_k(&self) -> Vec<WordCount> {
        self.state.lock().top.sorted()
    }

    /// Count for `word` (case-folded)
    pub fn count(&self, word: &str) -> u64 {
        self.state
            .lock()
            .counts
            .get(&word.to_lowercase())
            .copied()
            .unwrap_or(0)
    }

    /// Number of distinct words seen
    pub fn unique_words(&self) -> usize {
        self.state.lock().unique_words
    }

    /// Total words recorded
    pub fn total_words(&self) -> u64 {
        self.state.lock().total_words
    }

    /// Copy of the full frequency table
    pub fn counts(&self) -> HashMap<String, u64> {
        self.state.lock().counts.clone()
    }
}

impl Default for FrequencyTracker {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}
