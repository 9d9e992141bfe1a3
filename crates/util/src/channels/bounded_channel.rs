//! This module defines the [Taker] and [Putter] types for working with a
//! bounded, lossy SPSC (single producer single consumer) queue.
//!
//! The producer is never made to wait for the consumer: once `capacity` items
//! are pending, [Putter::try_put] refuses new items and drops them. The
//! consumer is never made to wait for the producer either: [Taker::try_take]
//! returns [None] right away if nothing is pending. Items that make it into
//! the queue come out in the order they went in, exactly once.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use super::THREAD_PANIC_MSG;

/// The receiving end of a bounded channel. Also see [Putter].
///
/// See [new] to construct.
#[derive(Debug)]
pub struct Taker<T> {
    channel: Arc<BoundedChannel<T>>,
}

impl<T> Taker<T> {
    /// Takes the oldest pending item, returning [None] if nothing is pending.
    ///
    /// Taking from an empty channel has no side effects.
    pub fn try_take(&self) -> Option<T> {
        self.channel.queue.lock().expect(THREAD_PANIC_MSG).pop_front()
    }

    /// The number of items that have been put but not taken.
    pub fn pending(&self) -> usize {
        self.channel.queue.lock().expect(THREAD_PANIC_MSG).len()
    }

    /// Whether the putter has dropped its end of the connection.
    pub fn connection_closed(&self) -> bool {
        !super::connection_not_dropped(&self.channel)
    }
}

/// The sending end of a bounded channel. Also see [Taker].
///
/// See [new] to construct.
#[derive(Debug)]
pub struct Putter<T> {
    channel: Arc<BoundedChannel<T>>,
}

impl<T> Putter<T> {
    /// Puts `item` at the back of the queue if fewer than the channel's
    /// capacity are pending, returning whether it was admitted.
    ///
    /// A refused item is dropped. It does not replace anything already in the
    /// queue. Items are also refused once the taker has been dropped.
    pub fn try_put(&self, item: T) -> bool {
        if self.connection_closed() {
            return false;
        }

        let mut queue = self.channel.queue.lock().expect(THREAD_PANIC_MSG);
        if queue.len() >= self.channel.capacity {
            return false;
        }
        queue.push_back(item);
        true
    }

    /// Whether [Self::try_put] would currently admit an item.
    ///
    /// Only the taker can change the answer from `false` to `true`, so with a
    /// single putter a `true` answer stays true until the next put.
    pub fn has_room(&self) -> bool {
        self.pending() < self.channel.capacity
    }

    /// The number of items that have been put but not taken.
    pub fn pending(&self) -> usize {
        self.channel.queue.lock().expect(THREAD_PANIC_MSG).len()
    }

    /// Whether the taker has dropped its end of the connection.
    pub fn connection_closed(&self) -> bool {
        !super::connection_not_dropped(&self.channel)
    }
}

/// Create a bounded channel's [Taker] and [Putter]. At most `capacity` items
/// will ever be pending at once.
///
/// `capacity` must be at least 1, otherwise this function will panic.
pub fn new<T>(capacity: usize) -> (Taker<T>, Putter<T>) {
    assert!(capacity > 0, "A bounded channel needs room for at least 1 item.");

    let channel = Arc::new(BoundedChannel {
        queue: Mutex::new(VecDeque::with_capacity(capacity)),
        capacity,
    });

    (
        Taker {
            channel: channel.clone(),
        },
        Putter { channel },
    )
}

#[derive(Debug)]
struct BoundedChannel<T> {
    queue: Mutex<VecDeque<T>>,
    capacity: usize,
}
