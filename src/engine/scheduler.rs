use std::{cmp::Ordering, collections::BinaryHeap};

/// Timer queue keyed by engine time (seconds).
///
/// Tasks fire in time order; tasks scheduled for the same instant fire in
/// the order they were enqueued. There is no way to cancel a task once it is
/// enqueued.
#[derive(Debug)]
pub struct Scheduler<T> {
    queue: BinaryHeap<Entry<T>>,
    seq: u64,
}

#[derive(Debug)]
struct Entry<T> {
    at: f64,
    seq: u64,
    task: T,
}

// BinaryHeap is a max-heap, so the ordering is reversed: earliest first.
impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .total_cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<T> Eq for Entry<T> {}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            seq: 0,
        }
    }

    pub fn enqueue(&mut self, at: f64, task: T) {
        self.queue.push(Entry {
            at,
            seq: self.seq,
            task,
        });
        self.seq += 1;
    }

    /// Remove and return every task due at or before `now`, earliest first.
    pub fn tick(&mut self, now: f64) -> Vec<T> {
        let mut due = Vec::new();
        while self.queue.peek().is_some_and(|e| e.at <= now) {
            if let Some(entry) = self.queue.pop() {
                due.push(entry.task);
            }
        }
        due
    }

    /// Time of the earliest pending task.
    pub fn next_due(&self) -> Option<f64> {
        self.queue.peek().map(|e| e.at)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}
