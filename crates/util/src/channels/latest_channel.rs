//! This module defines the [LatestReader] and [LatestWriter] types for working
//! with a single-slot SPSC (single producer single consumer) channel where only
//! the most recent value matters.
//!
//! Every [LatestWriter::put] replaces whatever value hasn't been read yet, so
//! the reader only ever sees the freshest value. There is no delivery
//! guarantee for older values.

use std::sync::{Arc, Condvar, Mutex};

use super::{ChannelError, ChannelResult, THREAD_PANIC_MSG};

/// The reading end of a latest-value channel. Also see [LatestWriter].
///
/// See [new] to construct.
#[derive(Debug)]
pub struct LatestReader<T> {
    channel: Arc<LatestChannel<T>>,
}

impl<T> LatestReader<T> {
    /// Takes the most recently written value if it hasn't been taken yet,
    /// returning [None] otherwise. Older unread values are never returned.
    pub fn try_take(&self) -> Option<T> {
        self.channel.slot.lock().expect(THREAD_PANIC_MSG).value.take()
    }

    /// Waits until a value is written, then takes it.
    ///
    /// A [ChannelError::ConnectionDropped] error is returned if the writer was
    /// dropped and there is no unread value.
    pub fn wait(&self) -> ChannelResult<T> {
        let mut slot = self.channel.slot.lock().expect(THREAD_PANIC_MSG);

        loop {
            if let Some(value) = slot.value.take() {
                return Ok(value);
            }

            // No value after waking up means one of two things:
            // 1. The writer hung up.
            // 2. This was a spurious (early) wakeup (should go back to sleep).
            if slot.writer_dropped {
                return Err(ChannelError::ConnectionDropped);
            }

            slot = self.channel.notifier.wait(slot).expect(THREAD_PANIC_MSG);
        }
    }
}

/// The writing end of a latest-value channel. Also see [LatestReader].
///
/// See [new] to construct.
#[derive(Debug)]
pub struct LatestWriter<T> {
    channel: Arc<LatestChannel<T>>,
}

impl<T> LatestWriter<T> {
    /// Writes `value`, replacing any value that hasn't been read yet.
    ///
    /// A [ChannelError::ConnectionDropped] error is returned if the reader was
    /// dropped.
    pub fn put(&self, value: T) -> ChannelResult<()> {
        super::ensure_connection_not_dropped(&self.channel)?;

        self.channel.slot.lock().expect(THREAD_PANIC_MSG).value = Some(value);
        self.channel.notifier.notify_one();

        Ok(())
    }
}

// The reader may be waiting. It has to be told that no more values are coming
// so it doesn't wait forever. The flag lives under the lock (instead of relying
// on the `Arc` count) because our `Arc` is only released after this returns.
impl<T> Drop for LatestWriter<T> {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.channel.slot.lock() {
            slot.writer_dropped = true;
        }
        self.channel.notifier.notify_one();
    }
}

/// Create a latest-value channel's [LatestReader] and [LatestWriter].
pub fn new<T>() -> (LatestReader<T>, LatestWriter<T>) {
    let channel = Arc::new(LatestChannel {
        slot: Mutex::new(Slot {
            value: None,
            writer_dropped: false,
        }),
        notifier: Condvar::default(),
    });

    (
        LatestReader {
            channel: channel.clone(),
        },
        LatestWriter { channel },
    )
}

#[derive(Debug)]
struct LatestChannel<T> {
    slot: Mutex<Slot<T>>,
    notifier: Condvar,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    writer_dropped: bool,
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;

    #[test]
    fn most_recent_value_wins() {
        let (reader, writer) = new::<i32>();

        writer.put(1).unwrap();
        writer.put(2).unwrap();
        writer.put(3).unwrap();

        assert_eq!(reader.try_take(), Some(3));
        assert_eq!(reader.try_take(), None);
    }

    #[test]
    fn empty_take_is_none() {
        let (reader, _writer) = new::<i32>();

        assert_eq!(reader.try_take(), None);
        assert_eq!(reader.try_take(), None);
    }

    #[test]
    fn wait_receives_value_from_other_thread() {
        let (reader, writer) = new::<&str>();

        let thread = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            writer.put("ready").unwrap();
        });

        assert_eq!(reader.wait(), Ok("ready"));
        thread.join().unwrap();
    }

    #[test]
    fn wait_returns_unread_value_after_writer_drop() {
        let (reader, writer) = new::<i32>();

        writer.put(5).unwrap();
        drop(writer);

        assert_eq!(reader.wait(), Ok(5));
        assert_eq!(reader.wait(), Err(ChannelError::ConnectionDropped));
    }

    #[test]
    fn wait_wakes_up_when_writer_drops() {
        let (reader, writer) = new::<i32>();

        let thread = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            drop(writer);
        });

        assert_eq!(reader.wait(), Err(ChannelError::ConnectionDropped));
        thread.join().unwrap();
    }

    #[test]
    fn put_fails_after_reader_drop() {
        let (reader, writer) = new::<i32>();
        drop(reader);

        assert_eq!(writer.put(1), Err(ChannelError::ConnectionDropped));
    }
}
