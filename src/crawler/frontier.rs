//! Crawl frontier state
//!
//! One struct owns all mutable bookkeeping for a run: the FIFO pending
//! queue, the ever-enqueued set (dedup barrier), the processed set, the
//! failure ledger, and the saved counter. It is passed by exclusive
//! reference through the run loop; there are no ambient globals.

use std::collections::{BTreeMap, HashSet, VecDeque};

/// Snapshot of the run counters, readable at any point
#[derive(Debug, Clone, Default)]
pub struct CrawlReport {
    /// Resources saved to disk (including resume skips)
    pub saved: usize,

    /// Targets processed, regardless of outcome
    pub visited: usize,

    /// Terminal failures, keyed by URL
    pub failed: BTreeMap<String, String>,
}

/// BFS queue plus dedup/visited bookkeeping
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    enqueued: HashSet<String>,
    processed: HashSet<String>,
    failed: BTreeMap<String, String>,
    saved: usize,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target unless it was ever enqueued before
    ///
    /// Returns true if the target was actually added. This is the dedup
    /// barrier: a URL discovered from two different pages is enqueued
    /// exactly once.
    pub fn enqueue(&mut self, url: &str) -> bool {
        if self.enqueued.contains(url) {
            return false;
        }
        self.enqueued.insert(url.to_string());
        self.queue.push_back(url.to_string());
        true
    }

    /// Pops the head of the queue (FIFO, so traversal is breadth-first)
    pub fn pop(&mut self) -> Option<String> {
        self.queue.pop_front()
    }

    /// Marks a popped target as processed
    ///
    /// Returns false if it was already processed this run; the caller
    /// skips it.
    pub fn begin(&mut self, url: &str) -> bool {
        if self.processed.contains(url) {
            return false;
        }
        self.processed.insert(url.to_string());
        true
    }

    /// Records a terminal fetch failure
    ///
    /// The ledger only grows; an existing entry is never overwritten.
    pub fn record_failure(&mut self, url: &str, reason: &str) {
        self.failed
            .entry(url.to_string())
            .or_insert_with(|| reason.to_string());
    }

    /// Counts one resource as saved
    pub fn record_saved(&mut self) {
        self.saved += 1;
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn saved_count(&self) -> usize {
        self.saved
    }

    pub fn visited_count(&self) -> usize {
        self.processed.len()
    }

    pub fn report(&self) -> CrawlReport {
        CrawlReport {
            saved: self.saved,
            visited: self.processed.len(),
            failed: self.failed.clone(),
        }
    }
}
