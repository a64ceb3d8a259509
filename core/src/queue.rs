//! Multi-producer handoff queue between import tasks and the consumer.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

/// FIFO queue safe to push from any thread.
///
/// Each push is atomic: a consumer never observes a partially pushed item,
/// and items from one producer arrive in the order that producer pushed them.
/// Ownership of a pushed item transfers to the queue.
#[derive(Debug)]
pub struct ThreadSafeQueue<T> {
    items: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> ThreadSafeQueue<T> {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    pub fn push(&self, item: T) {
        self.items.lock().push_back(item);
        self.available.notify_one();
    }

    /// Pop the oldest item without blocking.
    pub fn try_pop(&self) -> Option<T> {
        self.items.lock().pop_front()
    }

    /// Pop the oldest item, waiting up to `timeout` for one to arrive.
    pub fn pop_timeout(&self, timeout: Duration) -> Option<T> {
        let mut items = self.items.lock();
        if items.is_empty() {
            let _ = self
                .available
                .wait_while_for(&mut items, |items| items.is_empty(), timeout);
        }
        items.pop_front()
    }

    /// Take every queued item in push order.
    pub fn drain(&self) -> Vec<T> {
        self.items.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.lock().is_empty()
    }
}

impl<T> Default for ThreadSafeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn fifo_order() {
        let queue = ThreadSafeQueue::new();
        queue.push(1);
        queue.push(2);
        queue.push(3);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop(), Some(1));
        assert_eq!(queue.drain(), vec![2, 3]);
        assert!(queue.is_empty());
    }

    #[test]
    fn pop_timeout_on_empty_queue() {
        let queue: ThreadSafeQueue<u32> = ThreadSafeQueue::new();
        assert_eq!(queue.pop_timeout(Duration::from_millis(5)), None);
    }

    #[test]
    fn concurrent_producers_keep_per_producer_order() {
        let queue = Arc::new(ThreadSafeQueue::new());
        let producers: Vec<_> = (0..4)
            .map(|producer| {
                let queue = Arc::clone(&queue);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        queue.push((producer, i));
                    }
                })
            })
            .collect();
        for handle in producers {
            handle.join().unwrap();
        }

        let items = queue.drain();
        assert_eq!(items.len(), 1000);
        for producer in 0..4 {
            let seen: Vec<i32> = items
                .iter()
                .filter(|(p, _)| *p == producer)
                .map(|(_, i)| *i)
                .collect();
            assert_eq!(seen, (0..250).collect::<Vec<_>>());
        }
    }

    #[test]
    fn pop_timeout_wakes_on_push() {
        let queue = Arc::new(ThreadSafeQueue::new());
        let producer = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(10));
                queue.push("ready");
            })
        };
        assert_eq!(queue.pop_timeout(Duration::from_secs(5)), Some("ready"));
        producer.join().unwrap();
    }
}
