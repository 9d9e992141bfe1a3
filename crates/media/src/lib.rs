//! This library contains the live camera pipeline: capturing frames on a
//! worker thread, handing them to the UI through bounded channels, and turning
//! them into images the UI can draw.
//!
//! ```text
//! FrameSource → CaptureWorker → bounded channel → DisplayScheduler → render
//!                             ↘ latest channel (frame rate) ↗
//! ```

pub mod camera;
pub mod capture;
pub mod display;
pub mod frame;
pub mod lifecycle;

#[cfg(test)]
pub(crate) mod testing;
