//! Contains [DisplayScheduler], the fixed-interval poll that moves frames and
//! frame rate readings from the capture thread into a [DisplayState].

use std::num::NonZeroU32;
use std::time::Duration;

use util::channels::bounded_channel::Taker;
use util::channels::latest_channel::LatestReader;

use super::{DisplayableImage, render};
use crate::capture::{DEFAULT_TICK_INTERVAL, MetricSample};
use crate::frame::Frame;

/// How the display should show frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DisplayConfig {
    /// Frames are shrunk by this factor before they're shown.
    pub scale: NonZeroU32,
    /// How often [DisplayScheduler::tick] should be called.
    pub tick_interval: Duration,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            scale: NonZeroU32::MIN,
            tick_interval: DEFAULT_TICK_INTERVAL,
        }
    }
}

/// What the display is currently showing. Owned by the UI thread and only
/// changed through [DisplayScheduler::tick].
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    image: Option<DisplayableImage>,
    overlay_text: String,
    last_sample: Option<MetricSample>,
}

impl DisplayState {
    /// The most recently rendered image, if any frame has arrived yet.
    pub fn image(&self) -> Option<&DisplayableImage> {
        self.image.as_ref()
    }

    /// The frame rate text to draw over the image (e.g. `30 FPS`).
    pub fn overlay_text(&self) -> &str {
        &self.overlay_text
    }

    /// The last frame rate reading that arrived.
    pub fn last_sample(&self) -> Option<MetricSample> {
        self.last_sample
    }
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            image: None,
            overlay_text: MetricSample::new(0.0, None).overlay_text(),
            last_sample: None,
        }
    }
}

/// What changed during a [DisplayScheduler::tick]. The UI only redoes the
/// work for the parts that changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TickOutcome {
    pub image_updated: bool,
    pub overlay_updated: bool,
}

/// Polls the frame and metric channels on the UI thread. It never blocks:
/// every read is a "take if present".
#[derive(Debug)]
pub struct DisplayScheduler {
    frames: Taker<Frame>,
    metrics: LatestReader<MetricSample>,
    config: DisplayConfig,
}

impl DisplayScheduler {
    pub fn new(
        frames: Taker<Frame>,
        metrics: LatestReader<MetricSample>,
        config: DisplayConfig,
    ) -> Self {
        Self {
            frames,
            metrics,
            config,
        }
    }

    /// How often [Self::tick] should be called.
    pub fn interval(&self) -> Duration {
        self.config.tick_interval
    }

    /// Whether the capture side has stopped (its ends of the channels were
    /// dropped).
    pub fn capture_stopped(&self) -> bool {
        self.frames.connection_closed()
    }

    /// Take one pending frame (rendering it into `state`) and then the latest
    /// frame rate reading (updating the overlay text). Does nothing to `state`
    /// if neither is available, so it's safe to call at any cadence.
    pub fn tick(&self, state: &mut DisplayState) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        if let Some(frame) = self.frames.try_take() {
            state.image = Some(render(&frame, self.config.scale));
            outcome.image_updated = true;
        }

        if let Some(sample) = self.metrics.try_take() {
            let text = sample.overlay_text();
            outcome.overlay_updated = text != state.overlay_text;
            state.overlay_text = text;
            state.last_sample = Some(sample);
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use util::channels::bounded_channel::{self, Putter};
    use util::channels::latest_channel::{self, LatestWriter};

    use super::*;
    use crate::capture::FRAME_CHANNEL_CAPACITY;
    use crate::frame::PixelLayout;

    fn scheduler() -> (DisplayScheduler, Putter<Frame>, LatestWriter<MetricSample>) {
        let (taker, putter) = bounded_channel::new(FRAME_CHANNEL_CAPACITY);
        let (reader, writer) = latest_channel::new();
        let scheduler = DisplayScheduler::new(taker, reader, DisplayConfig::default());
        (scheduler, putter, writer)
    }

    fn frame(fill: u8) -> Frame {
        Frame::from_fill((4, 3).into(), PixelLayout::Bgr24, &[fill, fill, fill])
    }

    #[test]
    fn starts_at_zero_fps_with_no_image() {
        let state = DisplayState::default();

        assert_eq!(state.overlay_text(), "0 FPS");
        assert_eq!(state.image(), None);
    }

    #[test]
    fn empty_ticks_change_nothing() {
        let (scheduler, _putter, _writer) = scheduler();
        let mut state = DisplayState::default();
        let before = state.clone();

        for _ in 0..3 {
            assert_eq!(scheduler.tick(&mut state), TickOutcome::default());
        }
        assert_eq!(state, before);
    }

    #[test]
    fn one_frame_per_tick_in_order() {
        let (scheduler, putter, _writer) = scheduler();
        let mut state = DisplayState::default();

        assert!(putter.try_put(frame(10)));
        assert!(putter.try_put(frame(20)));

        assert!(scheduler.tick(&mut state).image_updated);
        assert_eq!(state.image().unwrap().rgba()[0], 10);

        assert!(scheduler.tick(&mut state).image_updated);
        assert_eq!(state.image().unwrap().rgba()[0], 20);

        // The last image stays up once the channel is empty.
        assert!(!scheduler.tick(&mut state).image_updated);
        assert_eq!(state.image().unwrap().rgba()[0], 20);
    }

    #[test]
    fn overlay_shows_latest_sample() {
        let (scheduler, _putter, writer) = scheduler();
        let mut state = DisplayState::default();

        writer.put(MetricSample::new(15.0, None)).unwrap();
        writer.put(MetricSample::new(30.0, None)).unwrap();

        let outcome = scheduler.tick(&mut state);
        assert!(outcome.overlay_updated);
        assert!(!outcome.image_updated);
        assert_eq!(state.overlay_text(), "30 FPS");

        writer.put(MetricSample::new(30.0, None)).unwrap();
        assert!(!scheduler.tick(&mut state).overlay_updated);
        assert_eq!(state.last_sample().map(|s| s.fps()), Some(30.0));
    }

    #[test]
    fn notices_when_capture_stops() {
        let (scheduler, putter, writer) = scheduler();
        assert!(!scheduler.capture_stopped());

        drop(putter);
        drop(writer);
        assert!(scheduler.capture_stopped());
    }
}
