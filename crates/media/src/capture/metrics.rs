//! Contains [MetricSample], the frame rate reading published with every
//! captured frame, and [FpsMeter] for measuring it.

use std::time::Instant;

/// A frame rate reading. The value is never negative (or NaN).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSample {
    fps: f64,
    at: Option<Instant>,
}

impl MetricSample {
    /// Create a sample. Negative and NaN rates are stored as `0`.
    pub fn new(fps: f64, at: Option<Instant>) -> Self {
        Self {
            fps: if fps > 0.0 { fps } else { 0.0 },
            at,
        }
    }

    /// Frames per second.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// When the frame this sample was taken with arrived, if known.
    pub fn at(&self) -> Option<Instant> {
        self.at
    }

    /// The text the overlay shows for this sample (e.g. `30 FPS` or
    /// `29.7 FPS`). Whole numbers are shown without a decimal point.
    pub fn overlay_text(&self) -> String {
        if self.fps.fract() == 0.0 {
            format!("{:.0} FPS", self.fps)
        } else {
            format!("{:.1} FPS", self.fps)
        }
    }
}

/// Measures a frame rate from the time between frames, smoothed with an
/// exponential moving average so the overlay doesn't flicker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FpsMeter {
    smoothing: f64,
    last_arrival: Option<Instant>,
    rate: Option<f64>,
}

impl FpsMeter {
    /// How much each new reading moves the average by default.
    pub const DEFAULT_SMOOTHING: f64 = 0.1;

    /// Create a meter where each new reading moves the average by `smoothing`
    /// (clamped between `0` and `1`, `1` meaning no smoothing at all).
    pub fn new(smoothing: f64) -> Self {
        Self {
            smoothing: smoothing.clamp(0.0, 1.0),
            last_arrival: None,
            rate: None,
        }
    }

    /// Record that a frame arrived at `now`.
    ///
    /// Frames arriving at the same instant as the last one are counted as the
    /// same frame.
    pub fn record(&mut self, now: Instant) {
        if let Some(last) = self.last_arrival {
            let elapsed = now.saturating_duration_since(last).as_secs_f64();
            if elapsed <= 0.0 {
                return;
            }

            let instant_rate = 1.0 / elapsed;
            self.rate = Some(match self.rate {
                Some(rate) => rate + self.smoothing * (instant_rate - rate),
                None => instant_rate,
            });
        }

        self.last_arrival = Some(now);
    }

    /// The smoothed rate, or [None] until at least 2 frames have arrived.
    pub fn rate(&self) -> Option<f64> {
        self.rate
    }
}

impl Default for FpsMeter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SMOOTHING)
    }
}
