//! A minimum-priority queue with a deterministic tie-break.
//!
//! Huffman tree construction pops the two lowest-weight nodes on every step,
//! and the shape of the resulting tree (and therefore the compressed output
//! bytes) depends on how equal weights are ordered. This queue resolves ties
//! by insertion order: of two entries with equal priority, the one pushed
//! earlier pops first. A monotone sequence counter acts as the secondary key
//! on top of a standard binary heap.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A min-queue over `(priority, insertion order)`.
///
/// # Example
/// ```
/// use filepress::priority_queue::MinQueue;
///
/// let mut queue = MinQueue::new();
/// queue.push("b", 2);
/// queue.push("a", 1);
/// queue.push("c", 1);
/// assert_eq!(queue.pop(), Some("a")); // lowest priority, inserted first
/// assert_eq!(queue.pop(), Some("c"));
/// assert_eq!(queue.pop(), Some("b"));
/// ```
#[derive(Debug, Clone)]
pub struct MinQueue<T> {
    heap: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

#[derive(Debug, Clone)]
struct Entry<T> {
    priority: u64,
    seq: u64,
    item: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed on both keys: BinaryHeap is a max-heap, we want the
        // lowest priority first and, among equals, the lowest sequence.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> MinQueue<T> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Push an item with the given priority.
    pub fn push(&mut self, item: T, priority: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            priority,
            seq,
            item,
        });
    }

    /// Remove and return the item with the lowest priority, breaking ties
    /// towards the earliest-inserted item.
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|entry| entry.item)
    }

    /// Number of items in the queue.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T> Default for MinQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
