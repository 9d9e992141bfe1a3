//! This module contains the submodules [bounded_channel] and [latest_channel],
//! 2 kinds of single producer single consumer handoff where the consumer never
//! has to wait on the producer.
//!
//! - [bounded_channel] is a lossy FIFO queue. Items are refused (and dropped)
//!   once the queue holds `capacity` items.
//! - [latest_channel] is a single slot where each write replaces the last one.

pub mod bounded_channel;
pub mod latest_channel;

use std::sync::Arc;

use thiserror::Error;

/// An alias for a [Result] that has [ChannelError] as the error type.
pub type ChannelResult<T> = Result<T, ChannelError>;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChannelError {
    #[error("One side of the connection was dropped.")]
    ConnectionDropped,
}

const THREAD_PANIC_MSG: &str = "Another thread panicked while holding a resource this one needs.";

/// Both ends of a channel hold one strong reference each, so a count below 2
/// means the other end is gone.
fn connection_not_dropped<T>(channel: &Arc<T>) -> bool {
    Arc::strong_count(channel) == 2
}

fn ensure_connection_not_dropped<T>(channel: &Arc<T>) -> ChannelResult<()> {
    if connection_not_dropped(channel) {
        Ok(())
    } else {
        Err(ChannelError::ConnectionDropped)
    }
}
