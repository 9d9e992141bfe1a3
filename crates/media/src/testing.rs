//! Fake [FrameSource]s for tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::capture::{CaptureError, FrameSource};
use crate::frame::{Frame, PixelLayout};

/// Serves a fixed number of small BGR frames, then fails every grab after that
/// with [CaptureError::GrabFailed] (like an unplugged camera).
///
/// Its nominal frame rate is the number of frames it has served so far, which
/// makes it easy to tell which frame a metric sample came from.
pub(crate) struct ScriptedSource {
    frames_left: usize,
    served: usize,
    frame: Frame,
    closed: Arc<AtomicBool>,
}

impl ScriptedSource {
    pub fn new(frame_count: usize) -> Self {
        Self::serving(
            Frame::from_fill((8, 6).into(), PixelLayout::Bgr24, &[1, 2, 3]),
            frame_count,
        )
    }

    /// Like [Self::new] but every frame served is a copy of `frame`.
    pub fn serving(frame: Frame, frame_count: usize) -> Self {
        Self {
            frames_left: frame_count,
            served: 0,
            frame,
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A source that never runs out of frames.
    pub fn endless() -> Self {
        Self::new(usize::MAX)
    }

    /// Set once [FrameSource::close] has been called.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

impl FrameSource for ScriptedSource {
    fn grab(&mut self) -> Result<(), CaptureError> {
        if self.frames_left == 0 {
            return Err(CaptureError::GrabFailed);
        }
        self.frames_left -= 1;
        self.served += 1;
        Ok(())
    }

    fn retrieve(&mut self) -> Result<Frame, CaptureError> {
        Ok(self.frame.clone())
    }

    fn nominal_frame_rate(&self) -> f64 {
        self.served as f64
    }

    fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
