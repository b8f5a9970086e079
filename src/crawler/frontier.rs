//! Frontier tracking: visited-set deduplication and the download budget
//!
//! The frontier is the one piece of state shared across the whole crawl.
//! Both operations are atomic check-and-mark primitives so the
//! at-most-once-visitation and download-cap invariants hold even if
//! tasks are ever dispatched concurrently: membership test and insert
//! happen under one lock, and the download counter reserves a slot with
//! a single compare-and-swap.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Shared crawl state: visited URLs and the downloaded-file counter
///
/// Created once at crawl start and discarded at crawl end; nothing is
/// persisted.
pub struct Frontier {
    visited: Mutex<HashSet<String>>,
    downloaded: AtomicUsize,
    max_files: usize,
}

impl Frontier {
    /// Creates a frontier with the given download cap (0 = unbounded).
    pub fn new(max_files: usize) -> Self {
        Self {
            visited: Mutex::new(HashSet::new()),
            downloaded: AtomicUsize::new(0),
            max_files,
        }
    }

    /// Atomically checks whether `url` was already visited and marks it
    /// visited if not. Returns true exactly once per URL per crawl.
    pub fn try_visit(&self, url: &str) -> bool {
        self.visited.lock().unwrap().insert(url.to_string())
    }

    /// Read-only membership test, used to pre-filter candidate links.
    /// The authoritative check remains [`Frontier::try_visit`].
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.lock().unwrap().contains(url)
    }

    /// Atomically reserves one download slot. Returns false when the cap
    /// is already reached; always true when the cap is 0 (unbounded).
    ///
    /// A reservation whose download later fails must be returned with
    /// [`Frontier::release_download`] so failed downloads are not counted.
    pub fn record_download(&self) -> bool {
        if self.max_files == 0 {
            self.downloaded.fetch_add(1, Ordering::SeqCst);
            return true;
        }

        self.downloaded
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                if n < self.max_files {
                    Some(n + 1)
                } else {
                    None
                }
            })
            .is_ok()
    }

    /// Returns a reserved download slot after a failed download.
    pub fn release_download(&self) {
        self.downloaded.fetch_sub(1, Ordering::SeqCst);
    }

    /// Returns true once the download cap is reached. Always false when
    /// the cap is 0.
    pub fn budget_exhausted(&self) -> bool {
        self.max_files != 0 && self.downloaded.load(Ordering::SeqCst) >= self.max_files
    }

    /// Number of downloads recorded so far.
    pub fn downloads(&self) -> usize {
        self.downloaded.load(Ordering::SeqCst)
    }

    /// Number of URLs visited so far.
    pub fn visited_count(&self) -> usize {
        self.visited.lock().unwrap().len()
    }
}
