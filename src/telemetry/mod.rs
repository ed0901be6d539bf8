//! Per-frame timing instrumentation.
//!
//! The analysis worker reports one [`FrameObservation`] per processed frame
//! to an injected [`MetricsHook`]. Nothing here is global: callers that want
//! no instrumentation pass [`NoopMetrics`], callers that want the running
//! average pass a [`FrameTimer`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::MetricsConfig;

/// What the worker knows about one processed frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameObservation {
    /// Zero-based index of the frame since the worker started
    pub frame_index: u64,
    /// Wall time spent in the DSP pipeline for this frame
    pub elapsed: Duration,
    /// Samples still buffered in the aggregator after extraction
    pub buffered_samples: usize,
}

/// Snapshot of the decayed moving average kept by [`FrameTimer`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimingSnapshot {
    pub frames_observed: u64,
    pub average_us: Option<f64>,
    pub max_us: f64,
}

/// Observer injected into the analysis worker.
pub trait MetricsHook: Send {
    fn on_frame(&mut self, observation: &FrameObservation);

    fn snapshot(&self) -> Option<TimingSnapshot> {
        None
    }
}

/// Hook that ignores every observation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetrics;

impl MetricsHook for NoopMetrics {
    fn on_frame(&mut self, _observation: &FrameObservation) {}
}

/// Decayed moving average of per-frame processing time.
///
/// Averaging starts after `warmup_frames` so start-up jitter is ignored; once
/// warmed up the average is logged every `log_every` frames.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    decay: f64,
    warmup_frames: u64,
    log_every: u64,
    frames: u64,
    average_secs: Option<f64>,
    max_secs: f64,
}

impl FrameTimer {
    pub fn new(decay: f64, warmup_frames: u64, log_every: u64) -> Self {
        Self {
            decay: decay.clamp(0.0, 1.0),
            warmup_frames,
            log_every: log_every.max(1),
            frames: 0,
            average_secs: None,
            max_secs: 0.0,
        }
    }

    pub fn from_config(config: &MetricsConfig) -> Self {
        Self::new(config.decay, config.warmup_frames, config.log_every_n_frames)
    }

    pub fn frames_observed(&self) -> u64 {
        self.frames
    }

    /// Current average, `None` until the warm-up is over
    pub fn average(&self) -> Option<Duration> {
        self.average_secs.map(Duration::from_secs_f64)
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::from_config(&MetricsConfig::default())
    }
}

impl MetricsHook for FrameTimer {
    fn on_frame(&mut self, observation: &FrameObservation) {
        self.frames += 1;
        if self.frames < self.warmup_frames {
            return;
        }

        let elapsed = observation.elapsed.as_secs_f64();
        self.max_secs = self.max_secs.max(elapsed);
        let average = match self.average_secs {
            Some(previous) => self.decay * previous + (1.0 - self.decay) * elapsed,
            None => elapsed,
        };
        self.average_secs = Some(average);

        if self.frames % self.log_every == 0 {
            log::info!(
                "[FrameTimer] frame={} avg={:.1}us max={:.1}us buffered={}",
                observation.frame_index,
                average * 1e6,
                self.max_secs * 1e6,
                observation.buffered_samples
            );
        }
    }

    fn snapshot(&self) -> Option<TimingSnapshot> {
        Some(TimingSnapshot {
            frames_observed: self.frames,
            average_us: self.average_secs.map(|secs| secs * 1e6),
            max_us: self.max_secs * 1e6,
        })
    }
}
