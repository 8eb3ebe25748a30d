use crossbeam::queue::ArrayQueue;
use crossbeam::utils::Backoff;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::{PipelineError, Result};

/// Create a bounded single-producer/single-consumer channel.
///
/// The channel is a fixed-capacity FIFO ring backed by crossbeam's
/// `ArrayQueue`. Exactly one writer and one reader exist over its lifetime:
/// neither half is `Clone`, so the type system enforces the SPSC discipline
/// that makes a lock unnecessary.
///
/// Both halves observe `shutdown`; a raised flag makes blocked calls return
/// [`PipelineError::Interrupted`] instead of waiting forever on a peer that
/// has died.
///
/// # Panics
///
/// Panics if `capacity` is zero. Callers validate capacity before any
/// channel is constructed.
pub fn bounded<T: Send>(capacity: usize, shutdown: Arc<AtomicBool>) -> (Sender<T>, Receiver<T>) {
    let queue = Arc::new(ArrayQueue::new(capacity));
    (
        Sender {
            queue: Arc::clone(&queue),
            shutdown: Arc::clone(&shutdown),
        },
        Receiver { queue, shutdown },
    )
}

/// The writing half of a bounded channel
#[derive(Debug)]
pub struct Sender<T: Send> {
    queue: Arc<ArrayQueue<T>>,
    shutdown: Arc<AtomicBool>,
}

/// The reading half of a bounded channel
#[derive(Debug)]
pub struct Receiver<T: Send> {
    queue: Arc<ArrayQueue<T>>,
    shutdown: Arc<AtomicBool>,
}

impl<T: Send> Sender<T> {
    /// Enqueue an item, blocking while the ring is full.
    pub fn put(&self, item: T) -> Result<()> {
        let backoff = Backoff::new();
        let mut pending = item;
        loop {
            match self.queue.push(pending) {
                Ok(()) => return Ok(()),
                Err(rejected) => {
                    if self.shutdown.load(Ordering::Relaxed) {
                        return Err(PipelineError::Interrupted);
                    }
                    pending = rejected;
                    if backoff.is_completed() {
                        thread::sleep(Duration::from_micros(10));
                    } else {
                        backoff.snooze();
                    }
                }
            }
        }
    }

    /// Number of items currently buffered
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the ring is currently empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Fixed capacity of the ring
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

impl<T: Send> Receiver<T> {
    /// Dequeue the oldest item, blocking while the ring is empty.
    ///
    /// Buffered items are drained before the shutdown flag is honoured, so
    /// in-flight data is never lost to a late cancellation.
    pub fn get(&self) -> Result<T> {
        let backoff = Backoff::new();
        loop {
            if let Some(item) = self.queue.pop() {
                return Ok(item);
            }
            if self.shutdown.load(Ordering::Relaxed) {
                return Err(PipelineError::Interrupted);
            }
            if backoff.is_completed() {
                thread::sleep(Duration::from_micros(10));
            } else {
                backoff.snooze();
            }
        }
    }

    /// Number of items currently buffered
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether the ring is currently empty
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Fixed capacity of the ring
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_shutdown() -> Arc<AtomicBool> {
        Arc::new(AtomicBool::new(false))
    }

    #[test]
    fn test_put_get_fifo() {
        let (tx, rx) = bounded(4, no_shutdown());
        for i in 0..4 {
            tx.put(i).unwrap();
        }
        for i in 0..4 {
            assert_eq!(rx.get().unwrap(), i);
        }
        assert!(rx.is_empty());
    }

    #[test]
    fn test_capacity() {
        let (tx, _rx) = bounded::<u8>(7, no_shutdown());
        assert_eq!(tx.capacity(), 7);
    }

    #[test]
    fn test_blocked_put_released_by_get() {
        let (tx, rx) = bounded(1, no_shutdown());
        tx.put(1).unwrap();

        let writer = thread::spawn(move || {
            // Blocks until the reader below makes room
            tx.put(2).unwrap();
        });

        thread::sleep(Duration::from_millis(20));
        assert_eq!(rx.get().unwrap(), 1);
        writer.join().unwrap();
        assert_eq!(rx.get().unwrap(), 2);
    }

    #[test]
    fn test_shutdown_interrupts_blocked_get() {
        let shutdown = no_shutdown();
        let (_tx, rx) = bounded::<u8>(1, Arc::clone(&shutdown));

        let flag = Arc::clone(&shutdown);
        let trigger = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::Relaxed);
        });

        assert!(matches!(rx.get(), Err(PipelineError::Interrupted)));
        trigger.join().unwrap();
    }

    #[test]
    fn test_buffered_items_drain_before_shutdown() {
        let shutdown = no_shutdown();
        let (tx, rx) = bounded(2, Arc::clone(&shutdown));
        tx.put(5).unwrap();
        shutdown.store(true, Ordering::Relaxed);

        // In-flight item is still delivered, only then does get() fail
        assert_eq!(rx.get().unwrap(), 5);
        assert!(matches!(rx.get(), Err(PipelineError::Interrupted)));
    }
}
