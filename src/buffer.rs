//! Cross-thread frame handoff.
//!
//! Two independent single-slot buffers connect the three loops: acquisition
//! publishes raw frames into one, processing publishes annotated frames into
//! the other. Each publish replaces the prior value entirely: last writer
//! wins, no queueing, no backpressure. A reader either sees the previous
//! complete value or the new complete value, never a mix, because the swap
//! happens under the slot's lock.
//!
//! The lock is held only for the move/clone itself; all processing happens
//! on the copy outside the lock.

use parking_lot::{Condvar, Mutex};

/// A single-slot, last-writer-wins shared value.
#[derive(Debug)]
pub struct FrameSlot<T: Clone> {
    slot: Mutex<Option<T>>,
}

// Written by hand so an empty slot needs no `T: Default`; the slot starts
// empty regardless of the payload type.
impl<T: Clone> Default for FrameSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FrameSlot<T> {
    /// Create an empty slot.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Replace the slot contents with a new value.
    pub fn publish(&self, value: T) {
        *self.slot.lock() = Some(value);
    }

    /// Copy out the current value, blocking briefly on the lock.
    ///
    /// Returns `None` only before the first publish.
    pub fn snapshot(&self) -> Option<T> {
        self.slot.lock().clone()
    }

    /// Copy out the current value only if the lock is free right now.
    ///
    /// Used by the UI loop, which skips a render cycle rather than wait.
    pub fn try_snapshot(&self) -> Option<T> {
        self.slot.try_lock().and_then(|guard| guard.clone())
    }
}

/// A one-shot readiness signal.
///
/// The acquisition loop opens the latch after its first successful capture;
/// the other loops block on it before touching the shared buffers. Replaces
/// a busy-wait spin with a condition variable.
#[derive(Debug, Default)]
pub struct ReadyLatch {
    ready: Mutex<bool>,
    condvar: Condvar,
}

impl ReadyLatch {
    /// Create a closed latch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the latch, waking all waiters. Idempotent.
    pub fn open(&self) {
        let mut ready = self.ready.lock();
        if !*ready {
            *ready = true;
            self.condvar.notify_all();
        }
    }

    /// Block until the latch is open.
    pub fn wait(&self) {
        let mut ready = self.ready.lock();
        while !*ready {
            self.condvar.wait(&mut ready);
        }
    }

    /// Check the latch without blocking.
    pub fn is_open(&self) -> bool {
        *self.ready.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_slot_starts_empty() {
        let slot: FrameSlot<Vec<u8>> = FrameSlot::new();
        assert!(slot.snapshot().is_none());
        assert!(slot.try_snapshot().is_none());
    }

    /// The payload only needs `Clone`; an empty default slot must not ask
    /// for more.
    #[test]
    fn test_default_slot_without_default_payload() {
        #[derive(Clone, Debug, PartialEq)]
        struct Payload(u32);

        let slot: FrameSlot<Payload> = FrameSlot::default();
        assert!(slot.snapshot().is_none());
        slot.publish(Payload(3));
        assert_eq!(slot.snapshot(), Some(Payload(3)));
    }

    #[test]
    fn test_publish_replaces() {
        let slot = FrameSlot::new();
        slot.publish(1u32);
        slot.publish(2u32);
        assert_eq!(slot.snapshot(), Some(2));
        // A snapshot does not consume the value.
        assert_eq!(slot.snapshot(), Some(2));
    }

    #[test]
    fn test_try_snapshot_skips_when_held() {
        let slot = Arc::new(FrameSlot::new());
        slot.publish(7u32);
        let guard = slot.slot.lock();
        assert!(slot.try_snapshot().is_none());
        drop(guard);
        assert_eq!(slot.try_snapshot(), Some(7));
    }

    /// A reader must never observe a torn value: every published vector is
    /// internally uniform, so any mixed-content observation is a tear.
    #[test]
    fn test_no_torn_reads() {
        let slot = Arc::new(FrameSlot::new());
        let writer_slot = Arc::clone(&slot);
        let writer = thread::spawn(move || {
            for i in 0..500u16 {
                writer_slot.publish(vec![i as u8; 4096]);
            }
        });

        let mut observed = 0usize;
        while observed < 200 {
            if let Some(buf) = slot.snapshot() {
                let first = buf[0];
                assert!(buf.iter().all(|&b| b == first), "torn frame observed");
                observed += 1;
            }
        }
        writer.join().expect("writer thread panicked");
    }

    #[test]
    fn test_latch_open_wakes_waiter() {
        let latch = Arc::new(ReadyLatch::new());
        assert!(!latch.is_open());

        let waiter_latch = Arc::clone(&latch);
        let waiter = thread::spawn(move || {
            waiter_latch.wait();
            true
        });

        thread::sleep(Duration::from_millis(20));
        latch.open();
        assert!(waiter.join().expect("waiter panicked"));
        assert!(latch.is_open());

        // Re-opening is a no-op and a later wait returns immediately.
        latch.open();
        latch.wait();
    }
}
