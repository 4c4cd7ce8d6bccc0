//! Crawl frontier: the breadth-first queue of URLs still to visit
//!
//! The frontier owns three pieces of state that must change together:
//! - The FIFO queue of pending entries
//! - The set of every URL ever admitted (queued or already dequeued)
//! - The processed-page counter that enforces the page limit
//!
//! Keeping them in one struct behind a single owner means a dequeue, the
//! processed increment, and the limit check are one step, as are the dedup
//! check and the insert on enqueue.

use crate::url::CrawlUrl;
use std::collections::{HashSet, VecDeque};

/// A URL waiting in the frontier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: CrawlUrl,

    /// Link distance from the seeds; seeds are depth 0
    pub depth: u32,
}

impl FrontierEntry {
    pub fn is_seed(&self) -> bool {
        self.depth == 0
    }
}

/// FIFO frontier with duplicate suppression and a page budget
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<FrontierEntry>,
    seen: HashSet<CrawlUrl>,
    limit: usize,
    processed: usize,
}

impl Frontier {
    /// Creates an empty frontier that will hand out at most `limit` URLs
    pub fn new(limit: usize) -> Self {
        Self {
            queue: VecDeque::new(),
            seen: HashSet::new(),
            limit,
            processed: 0,
        }
    }

    /// Admits a URL to the back of the queue
    ///
    /// No-op (returns false) when the URL was already admitted during this run,
    /// or when the URLs already processed plus those queued use up the budget.
    pub fn enqueue(&mut self, url: CrawlUrl, depth: u32) -> bool {
        if self.processed + self.queue.len() >= self.limit {
            return false;
        }
        if !self.seen.insert(url.clone()) {
            return false;
        }
        self.queue.push_back(FrontierEntry { url, depth });
        true
    }

    /// Takes the oldest queued entry and counts it as processed
    ///
    /// Returns None when the queue is empty or the limit has been reached.
    pub fn dequeue(&mut self) -> Option<FrontierEntry> {
        if self.processed >= self.limit {
            return None;
        }
        let entry = self.queue.pop_front()?;
        self.processed += 1;
        Some(entry)
    }

    /// Returns true if `url` was admitted during this run (queued or dequeued)
    pub fn contains(&self, url: &CrawlUrl) -> bool {
        self.seen.contains(url)
    }

    /// Number of URLs waiting in the queue
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs handed out by `dequeue`
    pub fn processed(&self) -> usize {
        self.processed
    }

    /// Number of URLs already dequeued, i.e. admitted but no longer queued
    pub fn visited(&self) -> usize {
        self.seen.len() - self.queue.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Returns true once the page budget has been fully handed out
    pub fn is_exhausted(&self) -> bool {
        self.processed >= self.limit
    }
}
