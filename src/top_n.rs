// Copyright 2026-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Bounded best-N retention.
//!
//! [`TopN`] is a lossy container: feed it any number of scored items and it
//! keeps only the N best, in O(log N) per insertion. Whether anything was
//! dropped is part of the API - callers surface it as the "more results may
//! exist" bit, since a dropped candidate means the true top-N could differ
//! had more of the corpus been scanned.
//!
//! Scores are `f32` but ordering must be total and deterministic, so entries
//! are keyed by [`encode_float`] and ties fall back to insertion order
//! (earlier wins).

use crate::scoring::encode_float;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Entry<T> {
    /// Order-preserving encoding of the score.
    key: u32,
    /// Insertion sequence; earlier entries win ties.
    seq: u64,
    score: f32,
    value: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher key is better; on equal keys the earlier insertion (smaller
        // seq) is better, so it compares greater.
        self.key
            .cmp(&other.key)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Fixed-capacity selector retaining the N highest-scoring items seen.
pub struct TopN<T> {
    capacity: usize,
    // Min-heap: the worst retained entry sits on top, ready for eviction.
    heap: BinaryHeap<Reverse<Entry<T>>>,
    next_seq: u64,
}

impl<T> TopN<T> {
    pub fn new(capacity: usize) -> Self {
        TopN {
            capacity,
            heap: BinaryHeap::with_capacity(capacity.saturating_add(1)),
            next_seq: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Offer an item. Returns true if anything was discarded - either the
    /// offered item or a previously retained one.
    pub fn push(&mut self, score: f32, value: T) -> bool {
        let entry = Entry {
            key: encode_float(score),
            seq: self.next_seq,
            score,
            value,
        };
        self.next_seq += 1;

        if self.capacity == 0 {
            return true;
        }
        if self.heap.len() < self.capacity {
            self.heap.push(Reverse(entry));
            return false;
        }
        // Full. Keep whichever of (entry, current worst) is better.
        let worst = self.heap.peek().expect("non-empty at capacity");
        if entry < worst.0 {
            return true;
        }
        self.heap.pop();
        self.heap.push(Reverse(entry));
        true
    }

    /// The retained items, best first; ties in insertion order.
    pub fn into_sorted_vec(self) -> Vec<(f32, T)> {
        let mut entries: Vec<Entry<T>> = self.heap.into_iter().map(|r| r.0).collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|e| (e.score, e.value)).collect()
    }
}
