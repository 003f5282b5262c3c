//! Work distribution for parallel workers.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Fixed list of work items claimed one at a time by worker threads.
///
/// Claiming is a single atomic increment, so workers never contend on a
/// lock and every item is handed out exactly once.
pub struct WorkQueue<T> {
    items: Vec<T>,
    cursor: AtomicUsize,
}

impl<T> WorkQueue<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Claim the next unprocessed item, or `None` when the queue is drained.
    pub fn next(&self) -> Option<&T> {
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.items.get(i)
    }

    /// Total items the queue started with.
    pub fn total(&self) -> usize {
        self.items.len()
    }

    /// Items not yet claimed (approximate under concurrent claiming).
    pub fn remaining(&self) -> usize {
        self.items
            .len()
            .saturating_sub(self.cursor.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_out_items_in_order() {
        let q = WorkQueue::new(vec!["a", "b", "c"]);
        assert_eq!(q.total(), 3);
        assert_eq!(q.next(), Some(&"a"));
        assert_eq!(q.next(), Some(&"b"));
        assert_eq!(q.next(), Some(&"c"));
        assert_eq!(q.next(), None);
    }

    #[test]
    fn empty_queue_yields_nothing() {
        let q: WorkQueue<i32> = WorkQueue::new(vec![]);
        assert_eq!(q.total(), 0);
        assert_eq!(q.next(), None);
    }

    #[test]
    fn remaining_decreases_as_items_claimed() {
        let q = WorkQueue::new(vec![1, 2]);
        assert_eq!(q.remaining(), 2);
        q.next();
        assert_eq!(q.remaining(), 1);
        q.next();
        q.next();
        assert_eq!(q.remaining(), 0);
    }

    #[test]
    fn each_item_claimed_exactly_once_across_threads() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicUsize;

        let q = Arc::new(WorkQueue::new((0..100).collect::<Vec<_>>()));
        let claimed = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let q = q.clone();
                let claimed = claimed.clone();
                std::thread::spawn(move || {
                    while q.next().is_some() {
                        claimed.fetch_add(1, Ordering::Relaxed);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(claimed.load(Ordering::Relaxed), 100);
    }
}
