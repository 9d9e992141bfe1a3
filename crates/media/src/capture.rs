//! Everything on the capture side of the pipeline: the [FrameSource] trait a
//! camera backend implements, the [CaptureConfig] it's opened with, the
//! [MetricSample]s published next to every frame, and the [CaptureWorker]
//! that drives a source on its own thread.
//!
//! The worker hands frames to the UI through a
//! [bounded channel](util::channels::bounded_channel) with room for
//! [FRAME_CHANNEL_CAPACITY] frames and publishes the frame rate through a
//! [latest channel](util::channels::latest_channel).

mod config;
mod metrics;
mod source;
mod worker;

pub use config::*;
pub use metrics::*;
pub use source::*;
pub use worker::*;

/// How many frames can be waiting for the UI at once. Frames captured while
/// the channel is full are dropped.
pub const FRAME_CHANNEL_CAPACITY: usize = 2;
